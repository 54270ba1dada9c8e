//! PlumX analytics documents and counter lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A named PlumX category (e.g. `mention`, `citation`) with its count types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsCategory {
    pub name: String,

    #[serde(default)]
    pub count_types: Vec<CountType>,
}

/// One count type inside a category (e.g. `NEWS_COUNT`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountType {
    pub name: String,

    #[serde(default)]
    pub total: u64,
}

/// The two counters attached to entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    News,
    Policy,
}

impl CitationKind {
    pub fn name(&self) -> &'static str {
        match self {
            CitationKind::News => "news",
            CitationKind::Policy => "policy",
        }
    }

    /// PlumX category family the counter belongs to
    pub fn family(&self) -> &'static str {
        match self {
            CitationKind::News => "mention",
            CitationKind::Policy => "citation",
        }
    }

    /// Total for this counter, or 0 when no category carries it.
    ///
    /// PlumX nests source-specific counts under the family category
    /// (`mention` > `NEWS_COUNT`), but documents keyed the other way round
    /// (`news` > `mention`) are accepted too.
    pub fn count_in(&self, categories: &[MetricsCategory]) -> u64 {
        find_count(categories, self.family(), self.name())
            .or_else(|| find_count(categories, self.name(), self.family()))
            .unwrap_or(0)
    }
}

impl std::fmt::Display for CitationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which counters to read from a PlumX document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationSelector {
    News,
    Policy,
    Both,
}

impl CitationSelector {
    pub fn kinds(&self) -> &'static [CitationKind] {
        match self {
            CitationSelector::News => &[CitationKind::News],
            CitationSelector::Policy => &[CitationKind::Policy],
            CitationSelector::Both => &[CitationKind::News, CitationKind::Policy],
        }
    }
}

/// Total of the first count type whose name contains `count_type`
/// (case-insensitive) inside the category named exactly `category`; 0 if absent.
pub fn extract_count(categories: &[MetricsCategory], category: &str, count_type: &str) -> u64 {
    find_count(categories, category, count_type).unwrap_or(0)
}

fn find_count(categories: &[MetricsCategory], category: &str, count_type: &str) -> Option<u64> {
    let needle = count_type.to_lowercase();
    categories
        .iter()
        .filter(|c| c.name == category)
        .flat_map(|c| c.count_types.iter())
        .find(|t| t.name.to_lowercase().contains(&needle))
        .map(|t| t.total)
}

/// Read the selected counters from a PlumX analytics document.
///
/// A document without a usable `count_categories` list (error bodies, unknown
/// DOIs) yields null counters; a present list with the counter missing yields 0.
pub fn access_citation_counts(
    document: &Value,
    selector: CitationSelector,
) -> BTreeMap<CitationKind, Option<u64>> {
    let categories = document
        .get("count_categories")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<MetricsCategory>>(v).ok());

    let Some(categories) = categories else {
        match document.get("id_value").and_then(Value::as_str) {
            Some(id) => tracing::warn!("No PlumX data for: {}", id),
            None => tracing::warn!("No PlumX data in analytics response"),
        }
        return selector.kinds().iter().map(|k| (*k, None)).collect();
    };

    selector
        .kinds()
        .iter()
        .map(|k| (*k, Some(k.count_in(&categories))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plumx_document() -> Value {
        json!({
            "id_type": "doi",
            "id_value": "10.1016/j.test.2024.01.001",
            "count_categories": [
                {
                    "name": "capture",
                    "total": 12,
                    "count_types": [{"name": "READER_COUNT", "total": 12}]
                },
                {
                    "name": "mention",
                    "total": 5,
                    "count_types": [
                        {"name": "BLOG_COUNT", "total": 2},
                        {"name": "NEWS_COUNT", "total": 3}
                    ]
                },
                {
                    "name": "citation",
                    "total": 9,
                    "count_types": [{"name": "POLICY_CITED_BY_COUNT", "total": 9}]
                }
            ]
        })
    }

    #[test]
    fn test_extract_count_matches_category_and_type() {
        let categories = vec![MetricsCategory {
            name: "news".to_string(),
            count_types: vec![CountType {
                name: "mention".to_string(),
                total: 7,
            }],
        }];
        assert_eq!(extract_count(&categories, "news", "mention"), 7);
        assert_eq!(extract_count(&categories, "policy", "citation"), 0);
        assert_eq!(extract_count(&categories, "news", "MENTION"), 7);
    }

    #[test]
    fn test_counts_from_plumx_document() {
        let counts = access_citation_counts(&plumx_document(), CitationSelector::Both);
        assert_eq!(counts.get(&CitationKind::News), Some(&Some(3)));
        assert_eq!(counts.get(&CitationKind::Policy), Some(&Some(9)));
    }

    #[test]
    fn test_category_keyed_by_counter_name() {
        let doc = json!({
            "count_categories": [
                {"name": "news", "count_types": [{"name": "mention", "total": 7}]}
            ]
        });
        let counts = access_citation_counts(&doc, CitationSelector::News);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&CitationKind::News), Some(&Some(7)));

        let policy = access_citation_counts(&doc, CitationSelector::Policy);
        assert_eq!(policy.get(&CitationKind::Policy), Some(&Some(0)));
    }

    #[test]
    fn test_missing_categories_yield_null() {
        let doc = json!({"id_value": "10.1/none"});
        let counts = access_citation_counts(&doc, CitationSelector::Both);
        assert_eq!(counts.get(&CitationKind::News), Some(&None));
        assert_eq!(counts.get(&CitationKind::Policy), Some(&None));

        let error_body = json!({"service-error": {"status": {"statusCode": "RESOURCE_NOT_FOUND"}}});
        let counts = access_citation_counts(&error_body, CitationSelector::Policy);
        assert_eq!(counts.get(&CitationKind::Policy), Some(&None));
        assert!(counts.get(&CitationKind::News).is_none());
    }

    #[test]
    fn test_selector_kinds() {
        assert_eq!(CitationSelector::Both.kinds().len(), 2);
        assert_eq!(CitationSelector::News.kinds(), &[CitationKind::News]);
    }
}

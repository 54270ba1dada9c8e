//! Entry model representing one bibliographic search result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column holding the PlumX policy-citation counter
pub const POLICY_CITATION_KEY: &str = "policy_citation_count";

/// Column holding the PlumX news-mention counter
pub const NEWS_MENTIONS_KEY: &str = "news_mentions";

const DOI_KEY: &str = "prism:doi";
const TITLE_KEY: &str = "dc:title";
const PUBLICATION_KEY: &str = "prism:publicationName";
const COVER_DATE_KEY: &str = "prism:coverDate";
const CREATOR_KEY: &str = "dc:creator";

/// A single search result as returned by the provider.
///
/// Entries are kept as flat JSON objects so that whatever fields the provider
/// returns survive into the JSON and CSV outputs unchanged. Field order is the
/// provider's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(Map<String, Value>);

impl Entry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Convert a JSON value into an entry; anything but an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Set a field, returning the entry (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a field, returning the previous value if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Digital Object Identifier, if present and non-empty
    pub fn doi(&self) -> Option<&str> {
        self.str_field(DOI_KEY)
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field(TITLE_KEY)
    }

    pub fn publication_name(&self) -> Option<&str> {
        self.str_field(PUBLICATION_KEY)
    }

    pub fn cover_date(&self) -> Option<&str> {
        self.str_field(COVER_DATE_KEY)
    }

    pub fn creator(&self) -> Option<&str> {
        self.str_field(CREATOR_KEY)
    }

    /// Policy-citation counter; `None` when absent or null
    pub fn policy_citation_count(&self) -> Option<u64> {
        self.0.get(POLICY_CITATION_KEY).and_then(Value::as_u64)
    }

    /// News-mention counter; `None` when absent or null
    pub fn news_mentions(&self) -> Option<u64> {
        self.0.get(NEWS_MENTIONS_KEY).and_then(Value::as_u64)
    }

    /// Attach both PlumX counters, writing JSON null for missing values
    pub fn set_counters(&mut self, policy: Option<u64>, news: Option<u64>) {
        self.0.insert(POLICY_CITATION_KEY.to_string(), policy.into());
        self.0.insert(NEWS_MENTIONS_KEY.to_string(), news.into());
    }

    /// Whether both counter columns have been attached (null or not)
    pub fn has_counters(&self) -> bool {
        self.0.contains_key(POLICY_CITATION_KEY) && self.0.contains_key(NEWS_MENTIONS_KEY)
    }

    /// The provider pads empty result sets with a single `{"error": ...}` entry
    pub fn is_error_placeholder(&self) -> bool {
        self.0.contains_key("error")
    }

    /// Render one field as a CSV cell
    pub fn csv_cell(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for Entry {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_accessors() {
        let entry = Entry::from_value(json!({
            "prism:doi": "10.1016/j.test.2024.01.001",
            "dc:title": "A Test Article",
            "prism:publicationName": "Journal of Tests",
            "prism:coverDate": "2024-01-15",
            "dc:creator": "Doe J."
        }))
        .unwrap();

        assert_eq!(entry.doi(), Some("10.1016/j.test.2024.01.001"));
        assert_eq!(entry.title(), Some("A Test Article"));
        assert_eq!(entry.publication_name(), Some("Journal of Tests"));
        assert_eq!(entry.cover_date(), Some("2024-01-15"));
        assert_eq!(entry.creator(), Some("Doe J."));
        assert!(!entry.has_counters());
    }

    #[test]
    fn test_blank_doi_is_missing() {
        let entry = Entry::new().with("prism:doi", "   ");
        assert_eq!(entry.doi(), None);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Entry::from_value(json!([1, 2, 3])).is_none());
        assert!(Entry::from_value(json!("entry")).is_none());
    }

    #[test]
    fn test_set_counters_writes_nulls() {
        let mut entry = Entry::new().with("prism:doi", "10.1/x");
        entry.set_counters(None, Some(4));

        assert!(entry.has_counters());
        assert_eq!(entry.get(POLICY_CITATION_KEY), Some(&Value::Null));
        assert_eq!(entry.policy_citation_count(), None);
        assert_eq!(entry.news_mentions(), Some(4));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let entry = Entry::new()
            .with("prism:doi", "10.1/x")
            .with("dc:title", "T")
            .with("alpha", 1);
        let keys: Vec<&str> = entry.keys().collect();
        assert_eq!(keys, vec!["prism:doi", "dc:title", "alpha"]);
    }

    #[test]
    fn test_csv_cell_rendering() {
        let entry = Entry::new()
            .with("s", "text")
            .with("n", 3)
            .with("z", Value::Null)
            .with("l", json!(["a", "b"]));

        assert_eq!(entry.csv_cell("s"), "text");
        assert_eq!(entry.csv_cell("n"), "3");
        assert_eq!(entry.csv_cell("z"), "");
        assert_eq!(entry.csv_cell("missing"), "");
        assert_eq!(entry.csv_cell("l"), r#"["a","b"]"#);
    }

    #[test]
    fn test_error_placeholder() {
        let entry = Entry::new().with("error", "Result set was empty");
        assert!(entry.is_error_placeholder());
    }
}

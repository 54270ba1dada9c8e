//! Search filters and the provider query-string builder.

use serde::{Deserialize, Serialize};

use crate::api::ElsevierError;

/// Number of entries requested per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Fields requested from the search endpoints
pub const SEARCH_FIELDS: &str =
    "prism:doi,dc:title,prism:publicationName,prism:coverDate,dc:creator";

/// Boolean operator used to join query terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

impl BoolOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOperator::And => "AND",
            BoolOperator::Or => "OR",
        }
    }
}

/// Join terms with a padded boolean operator (`a AND b`)
pub fn join_with_operator<S: AsRef<str>>(terms: &[S], operator: BoolOperator) -> String {
    let separator = format!(" {} ", operator.as_str());
    terms
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(&separator)
}

/// User-supplied search filters
///
/// Every filter is optional; at least one list must contain a term for a
/// query to be built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Keywords matched against article titles (all must match)
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Four-letter Scopus subject-area codes, e.g. `MEDI` (any may match)
    #[serde(default)]
    pub subjects: Vec<String>,

    /// Scopus author identifiers (any may match)
    #[serde(default)]
    pub author_ids: Vec<String>,

    /// Author names, e.g. `Fujii` or `Abdellasset, W` (any may match)
    #[serde(default)]
    pub authors: Vec<String>,

    /// Year range such as `2020-2025`
    #[serde(default)]
    pub date_range: Option<String>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    pub fn author_id(mut self, author_id: impl Into<String>) -> Self {
        self.author_ids.push(author_id.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn date_range(mut self, range: impl Into<String>) -> Self {
        self.date_range = Some(range.into());
        self
    }

    /// Whether any subject filter was supplied
    pub fn has_subjects(&self) -> bool {
        !terms(&self.subjects).is_empty()
    }

    /// Whether any author-identifier filter was supplied
    pub fn has_author_ids(&self) -> bool {
        !terms(&self.author_ids).is_empty()
    }
}

/// Query-string parameters for one search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    /// Offset of the first entry in the page
    pub start: usize,
    /// Requested page size
    pub count: usize,
    /// Comma-separated field list
    pub field: String,
    /// Optional date filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    query: String,
}

impl QueryParameters {
    /// The boolean query string; never empty
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Key/value pairs in the order they are sent
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start", self.start.to_string()),
            ("count", self.count.to_string()),
            ("field", self.field.clone()),
        ];
        if let Some(date) = &self.date {
            pairs.push(("date", date.clone()));
        }
        pairs.push(("query", self.query.clone()));
        pairs
    }
}

/// Build the search parameters for a filter.
///
/// Clauses appear in a fixed order, each joined by `AND`:
///
/// 1. `TITLE('k1' AND 'k2')` for keywords
/// 2. `SUBJAREA(S1 OR S2)` for subjects
/// 3. `AU-ID(1) OR AU-ID(2)` for author identifiers
/// 4. `AUTHOR-NAME(A OR B)` for author names
///
/// Blank terms are ignored. Fails with [`ElsevierError::InvalidQuery`] when no
/// clause can be produced, since the provider rejects an empty query.
pub fn write_query(filter: &SearchFilter) -> Result<QueryParameters, ElsevierError> {
    let mut clauses = Vec::new();

    let keywords = terms(&filter.keywords);
    if !keywords.is_empty() {
        let quoted: Vec<String> = keywords.iter().map(|k| format!("'{}'", k)).collect();
        clauses.push(format!(
            "TITLE({})",
            join_with_operator(&quoted, BoolOperator::And)
        ));
    }

    let subjects = terms(&filter.subjects);
    if !subjects.is_empty() {
        clauses.push(format!(
            "SUBJAREA({})",
            join_with_operator(&subjects, BoolOperator::Or)
        ));
    }

    let author_ids = terms(&filter.author_ids);
    if !author_ids.is_empty() {
        let wrapped: Vec<String> = author_ids.iter().map(|id| format!("AU-ID({})", id)).collect();
        clauses.push(join_with_operator(&wrapped, BoolOperator::Or));
    }

    let authors = terms(&filter.authors);
    if !authors.is_empty() {
        clauses.push(format!(
            "AUTHOR-NAME({})",
            join_with_operator(&authors, BoolOperator::Or)
        ));
    }

    let query = join_with_operator(&clauses, BoolOperator::And);
    if query.is_empty() {
        return Err(ElsevierError::InvalidQuery(
            "Query parameter cannot be empty".to_string(),
        ));
    }

    let date = filter
        .date_range
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(QueryParameters {
        start: 0,
        count: DEFAULT_PAGE_SIZE,
        field: SEARCH_FIELDS.to_string(),
        date,
        query,
    })
}

fn terms(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_quoted_and_anded() {
        let filter = SearchFilter::new().keyword("meta-analysis").keyword("depression");
        let params = write_query(&filter).unwrap();
        assert_eq!(params.query(), "TITLE('meta-analysis' AND 'depression')");
    }

    #[test]
    fn test_clause_order_is_fixed() {
        let filter = SearchFilter::new()
            .author("Fujii")
            .author_id("57190000000")
            .subject("MEDI")
            .subject("PSYC")
            .keyword("sleep");
        let params = write_query(&filter).unwrap();
        assert_eq!(
            params.query(),
            "TITLE('sleep') AND SUBJAREA(MEDI OR PSYC) AND AU-ID(57190000000) AND AUTHOR-NAME(Fujii)"
        );
    }

    #[test]
    fn test_author_ids_have_no_outer_wrapper() {
        let filter = SearchFilter::new().author_id("1").author_id("2");
        let params = write_query(&filter).unwrap();
        assert_eq!(params.query(), "AU-ID(1) OR AU-ID(2)");
    }

    #[test]
    fn test_one_clause_per_category() {
        let filter = SearchFilter::new()
            .keyword("a")
            .keyword("b")
            .author("X")
            .author("Y");
        let params = write_query(&filter).unwrap();
        let clauses: Vec<&str> = params.query().split(") AND ").collect();
        assert_eq!(clauses.len(), 2);
        assert!(clauses[0].starts_with("TITLE("));
        assert!(clauses[1].starts_with("AUTHOR-NAME("));
    }

    #[test]
    fn test_empty_filter_is_rejected() {
        let result = write_query(&SearchFilter::new());
        assert!(matches!(result, Err(ElsevierError::InvalidQuery(_))));

        let date_only = SearchFilter::new().date_range("2020-2025");
        assert!(matches!(
            write_query(&date_only),
            Err(ElsevierError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_blank_terms_are_ignored() {
        let filter = SearchFilter::new().keyword("  ").author("");
        assert!(write_query(&filter).is_err());
    }

    #[test]
    fn test_fixed_parameters() {
        let filter = SearchFilter::new().keyword("x").date_range("2020-2025");
        let params = write_query(&filter).unwrap();
        assert_eq!(params.start, 0);
        assert_eq!(params.count, 50);
        assert_eq!(params.field, SEARCH_FIELDS);
        assert_eq!(params.date.as_deref(), Some("2020-2025"));

        let pairs = params.to_pairs();
        assert_eq!(pairs[0], ("start", "0".to_string()));
        assert!(pairs.iter().any(|(k, v)| *k == "date" && v == "2020-2025"));
        assert_eq!(pairs.last().unwrap().0, "query");
    }

    #[test]
    fn test_join_with_operator() {
        assert_eq!(join_with_operator(&["a", "b", "c"], BoolOperator::Or), "a OR b OR c");
        assert_eq!(join_with_operator::<&str>(&[], BoolOperator::And), "");
    }
}

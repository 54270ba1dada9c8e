//! Core data models for search results, queries, metrics and objects.

mod entry;
mod metrics;
mod object;
mod query;

pub use entry::{Entry, NEWS_MENTIONS_KEY, POLICY_CITATION_KEY};
pub use metrics::{
    access_citation_counts, extract_count, CitationKind, CitationSelector, CountType,
    MetricsCategory,
};
pub use object::{ObjectIndex, ObjectKind, ObjectReference};
pub use query::{
    join_with_operator, write_query, BoolOperator, QueryParameters, SearchFilter,
    DEFAULT_PAGE_SIZE, SEARCH_FIELDS,
};

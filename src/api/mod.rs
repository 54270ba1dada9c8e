//! Elsevier API client and the search, metrics and object workflows.
//!
//! The [`ElsevierClient`] bundles the HTTP client, injected credentials, the
//! API base URL, a request [`Pacer`](crate::utils::Pacer) and the result
//! directory layout. The workflows are implemented as methods on it:
//!
//! - [`ElsevierClient::search`]: paginated Scopus / ScienceDirect search
//! - [`ElsevierClient::plumx_metrics`]: PlumX policy/news counter enrichment
//! - [`ElsevierClient::retrieve_article_objects`]: figure and manuscript download
//!
//! Every workflow is strictly sequential; the only suspension point between
//! requests is the pacer between search pages.

mod metrics;
mod objects;
mod search;

pub use metrics::sort_by_counters;
pub use objects::ObjectReport;
pub use search::{parse_search_page, SearchOptions, SearchPage};

use reqwest::header::HeaderMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, Credentials, ItemFailurePolicy};
use crate::utils::{build_headers, FixedDelay, HttpClient, OutputLayout, Pacer};

/// Default API host
pub const ELSEVIER_API_BASE: &str = "https://api.elsevier.com";

/// `Accept` header for metadata requests
pub const ACCEPT_JSON: &str = "application/json";

/// `Accept` header for binary downloads
pub const ACCEPT_ANY: &str = "*/*";

/// Fixed pause between search pages
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(5);

/// Search endpoint family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Scopus,
    ScienceDirect,
}

impl Provider {
    /// Identifier used in output file names
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Scopus => "scopus",
            Provider::ScienceDirect => "sciencedirect",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Scopus => "Scopus",
            Provider::ScienceDirect => "ScienceDirect",
        }
    }

    /// Endpoint path below the API base URL
    pub fn search_path(&self) -> &'static str {
        match self {
            Provider::Scopus => "/content/search/scopus",
            Provider::ScienceDirect => "/content/search/sciencedirect",
        }
    }

    /// ScienceDirect has no subject-area or author-identifier fields
    pub fn supports_subjects(&self) -> bool {
        matches!(self, Provider::Scopus)
    }

    pub fn supports_author_ids(&self) -> bool {
        matches!(self, Provider::Scopus)
    }
}

impl FromStr for Provider {
    type Err = ElsevierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scopus" => Ok(Provider::Scopus),
            "sciencedirect" | "scidir" => Ok(Provider::ScienceDirect),
            other => Err(ElsevierError::InvalidQuery(format!(
                "Unknown database '{}': use 'scopus', 'sciencedirect' or 'scidir'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors that can occur when talking to the Elsevier APIs
#[derive(Debug, thiserror::Error)]
pub enum ElsevierError {
    /// The response came back as something other than the requested JSON
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Empty query or a filter the provider does not accept
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// An entry has no DOI to look up
    #[error("Missing identifier: {0}")]
    MissingIdentifier(String),

    /// An analytics or object-index document was absent or malformed
    #[error("Lookup miss: {0}")]
    LookupMiss(String),

    /// Content type that is neither JSON, XML nor a binary object
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bad configuration value (e.g. a credential that is not a valid header)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<reqwest::Error> for ElsevierError {
    fn from(err: reqwest::Error) -> Self {
        ElsevierError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ElsevierError {
    fn from(err: serde_json::Error) -> Self {
        ElsevierError::Parse(format!("JSON: {}", err))
    }
}

impl From<csv::Error> for ElsevierError {
    fn from(err: csv::Error) -> Self {
        ElsevierError::Csv(err.to_string())
    }
}

/// Client for the Elsevier search, analytics and object APIs
#[derive(Debug, Clone)]
pub struct ElsevierClient {
    http: Arc<HttpClient>,
    credentials: Credentials,
    base_url: String,
    pacer: Arc<dyn Pacer>,
    layout: OutputLayout,
    failure_policy: ItemFailurePolicy,
}

impl ElsevierClient {
    /// Create a client with default settings for the given credentials
    pub fn new(credentials: Credentials) -> Result<Self, ElsevierError> {
        Ok(Self {
            http: Arc::new(HttpClient::new()?),
            credentials,
            base_url: ELSEVIER_API_BASE.to_string(),
            pacer: Arc::new(FixedDelay::new(DEFAULT_PAGE_DELAY)),
            layout: OutputLayout::default(),
            failure_policy: ItemFailurePolicy::default(),
        })
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ElsevierError> {
        Ok(Self {
            http: Arc::new(HttpClient::with_timeout(config.api.timeout_secs)?),
            credentials: config.credentials.clone(),
            base_url: config.api.base_url.clone(),
            pacer: Arc::new(FixedDelay::from_secs_f64(config.search.page_delay_secs)),
            layout: OutputLayout::new(&config.output.results_dir),
            failure_policy: config.downloads.on_item_failure,
        })
    }

    /// Point the client at a different API host (mock servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the pacer used between search pages
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Write results below a different root directory
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.layout = OutputLayout::new(dir);
        self
    }

    /// Set the per-item download failure policy
    pub fn with_failure_policy(mut self, policy: ItemFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn failure_policy(&self) -> ItemFailurePolicy {
        self.failure_policy
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn json_headers(&self) -> Result<HeaderMap, ElsevierError> {
        build_headers(&self.credentials, ACCEPT_JSON)
    }

    fn binary_headers(&self) -> Result<HeaderMap, ElsevierError> {
        build_headers(&self.credentials, ACCEPT_ANY)
    }
}

//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `ELSEVIER_CLIENT_*` environment variables (e.g.
//! `ELSEVIER_CLIENT_SEARCH__PAGE_DELAY_SECS=2`). Credentials always come from
//! `ELSEVIER_API_KEY` / `ELSEVIER_INST_TOKEN` and are injected into the
//! client rather than read by the workflows themselves.

mod file_config;

pub use file_config::{find_config_file, write_default_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::ELSEVIER_API_BASE;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ELSEVIER_API_KEY";

/// Environment variable holding the institutional token
pub const INST_TOKEN_ENV: &str = "ELSEVIER_INST_TOKEN";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API credentials (never read from or written to files)
    #[serde(skip)]
    pub credentials: Credentials,

    /// API endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Download settings
    #[serde(default)]
    pub downloads: DownloadConfig,
}

/// Elsevier API credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key; requests without one fail with the provider's own auth error
    pub api_key: Option<String>,

    /// Institutional token; empty when not configured
    pub inst_token: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, inst_token: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            inst_token: inst_token.into(),
        }
    }

    /// Read `ELSEVIER_API_KEY` and `ELSEVIER_INST_TOKEN` (default "")
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            inst_token: std::env::var(INST_TOKEN_ENV).unwrap_or_default(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::from_env()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("inst_token", &(!self.inst_token.is_empty()).then_some("<redacted>"))
            .finish()
    }
}

/// API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    ELSEVIER_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Pause between result pages, in seconds
    #[serde(default = "default_page_delay")]
    pub page_delay_secs: f64,

    /// Stop paginating once this many entries are accumulated (0 = no cap)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Also write a CSV next to the JSON results
    #[serde(default)]
    pub save_csv: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_delay_secs: default_page_delay(),
            max_results: default_max_results(),
            save_csv: false,
        }
    }
}

impl SearchConfig {
    /// Result cap, `None` when unlimited
    pub fn result_cap(&self) -> Option<usize> {
        (self.max_results > 0).then_some(self.max_results)
    }
}

fn default_page_delay() -> f64 {
    5.0
}

fn default_max_results() -> usize {
    50
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for result files
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("./results")
}

/// What to do when one object download fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemFailurePolicy {
    /// Log the failure and continue with the next object
    #[default]
    Skip,
    /// Stop downloading the remaining objects of the same kind for the article
    Abort,
}

/// Download configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Policy applied to both graphic and manuscript downloads
    #[serde(default)]
    pub on_item_failure: ItemFailurePolicy,
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("ELSEVIER_CLIENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.credentials = Credentials::from_env();
    Ok(config)
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.elsevier.com");
        assert_eq!(config.search.page_delay_secs, 5.0);
        assert_eq!(config.search.result_cap(), Some(50));
        assert_eq!(config.downloads.on_item_failure, ItemFailurePolicy::Skip);
        assert_eq!(config.output.results_dir, PathBuf::from("./results"));
    }

    #[test]
    fn test_result_cap_zero_is_unlimited() {
        let search = SearchConfig {
            max_results: 0,
            ..SearchConfig::default()
        };
        assert_eq!(search.result_cap(), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("elsevier-client.toml");
        std::fs::write(
            &path,
            r#"
[api]
timeout_secs = 60

[search]
page_delay_secs = 1.5
max_results = 0
save_csv = true

[output]
results_dir = "/tmp/elsevier-results"

[downloads]
on_item_failure = "abort"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.api.base_url, "https://api.elsevier.com");
        assert_eq!(config.search.page_delay_secs, 1.5);
        assert_eq!(config.search.result_cap(), None);
        assert!(config.search.save_csv);
        assert_eq!(config.output.results_dir, PathBuf::from("/tmp/elsevier-results"));
        assert_eq!(config.downloads.on_item_failure, ItemFailurePolicy::Abort);
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = Credentials::new("super-secret", "token");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

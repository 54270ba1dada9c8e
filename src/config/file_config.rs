//! Configuration file discovery and creation.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://api.elsevier.com"
//! timeout_secs = 30
//!
//! [search]
//! page_delay_secs = 5.0
//! max_results = 50
//! save_csv = false
//!
//! [output]
//! results_dir = "./results"
//!
//! [downloads]
//! on_item_failure = "skip"
//! ```
//!
//! Credentials are not stored in the file; set `ELSEVIER_API_KEY` and
//! optionally `ELSEVIER_INST_TOKEN`.

use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up in the working directory
const LOCAL_CONFIG_NAME: &str = "elsevier-client.toml";

/// Find a configuration file: `./elsevier-client.toml`, then
/// `<config dir>/elsevier-client/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("elsevier-client").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Write the default configuration as TOML, refusing to overwrite
pub fn write_default_config(path: &Path) -> Result<(), ConfigFileError> {
    if path.exists() {
        return Err(ConfigFileError::Exists(path.display().to_string()));
    }

    let content = toml::to_string_pretty(&Config::default())
        .map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
    }

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Configuration file already exists: {0}")]
    Exists(String),
}

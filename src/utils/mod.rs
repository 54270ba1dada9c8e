//! Utility modules supporting the API workflows.
//!
//! - [`HttpClient`]: single GET requests classified by content type into a [`FetchResult`]
//! - [`build_headers`]: credential and `Accept` headers for Elsevier requests
//! - [`Pacer`]: "wait before the next request" capability ([`FixedDelay`], [`NoDelay`])
//! - [`OutputLayout`]: result directory layout and JSON / CSV / binary writers
//!
//! # Pacing
//!
//! ```rust
//! use elsevier_client::utils::{FixedDelay, NoDelay, Pacer};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let polite = FixedDelay::new(Duration::from_millis(10));
//! polite.wait().await;
//!
//! // Tests skip the delay entirely
//! NoDelay.wait().await;
//! # }
//! ```

mod http;
mod output;
mod pacing;

pub use http::{build_headers, classify_content_type, ContentClass, FetchResult, HttpClient};
pub use output::{
    datestamp, read_entries, sanitize_doi, timestamp, unique_path, write_binary, write_csv,
    write_json, OutputLayout,
};
pub use pacing::{FixedDelay, NoDelay, Pacer};

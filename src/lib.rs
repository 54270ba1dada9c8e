//! # Elsevier Client
//!
//! A thin client for the Elsevier literature-search, PlumX analytics and
//! object-retrieval APIs.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Entry, SearchFilter, PlumX metrics, object references)
//! - [`api`]: The API client, provider selection and the search / metrics / object workflows
//! - [`utils`]: HTTP fetching, request pacing and result file output
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use api::{ElsevierClient, ElsevierError, Provider};
pub use models::{Entry, SearchFilter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

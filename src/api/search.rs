//! Paginated Scopus / ScienceDirect search.

use serde_json::Value;

use super::{ElsevierClient, ElsevierError, Provider};
use crate::config::SearchConfig;
use crate::models::{write_query, Entry, SearchFilter};
use crate::utils::{timestamp, write_csv, write_json};

/// Per-call search options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Stop once this many entries are accumulated; `None` fetches every page
    pub max_results: Option<usize>,
    /// Also write the results as CSV
    pub save_csv: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: Some(50),
            save_csv: false,
        }
    }
}

impl SearchOptions {
    pub fn max_results(mut self, max: Option<usize>) -> Self {
        self.max_results = max;
        self
    }

    pub fn save_csv(mut self, save: bool) -> Self {
        self.save_csv = save;
        self
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_results: config.result_cap(),
            save_csv: config.save_csv,
        }
    }
}

/// One parsed page of search results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Entries on the page, without the provider's error placeholders
    pub entries: Vec<Entry>,
    /// Number of raw entries the provider returned, placeholders included
    pub raw_len: usize,
    /// Total hits reported by the provider
    pub total: usize,
    /// Offset of the first entry on this page
    pub start: usize,
    /// Page size reported by the provider
    pub per_page: usize,
}

impl SearchPage {
    /// Offset of the next page
    pub fn next_start(&self) -> usize {
        self.start + self.raw_len
    }
}

/// Parse the `search-results` envelope of a search response.
///
/// Counters may be numbers or numeric strings (the provider sends strings).
/// A page without `opensearch:startIndex` is taken to start at
/// `requested_start`, the offset the request asked for.
pub fn parse_search_page(
    document: &Value,
    requested_start: usize,
) -> Result<SearchPage, ElsevierError> {
    let results = document.get("search-results").ok_or_else(|| {
        ElsevierError::LookupMiss(format!(
            "'search-results' does not exist in output: {}",
            document
        ))
    })?;

    let raw_entries = match results.get("entry") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    };
    let raw_len = raw_entries.len();

    let total = read_count(results, "opensearch:totalResults").ok_or_else(|| {
        ElsevierError::LookupMiss(
            "'opensearch:totalResults' missing from search results".to_string(),
        )
    })?;
    let start = read_count(results, "opensearch:startIndex").unwrap_or(requested_start);
    let per_page = read_count(results, "opensearch:itemsPerPage").unwrap_or(raw_len);

    let entries = raw_entries
        .into_iter()
        .filter_map(Entry::from_value)
        .filter(|entry| !entry.is_error_placeholder())
        .collect();

    Ok(SearchPage {
        entries,
        raw_len,
        total,
        start,
        per_page,
    })
}

fn read_count(results: &Value, key: &str) -> Option<usize> {
    match results.get(key)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ElsevierClient {
    /// Search Scopus or ScienceDirect, following pagination.
    ///
    /// Pages are fetched until the provider's total is reached or the
    /// accumulated count reaches `options.max_results` (checked after each
    /// page, so the last page is never truncated). The pacer runs between
    /// pages only. All entries are written to
    /// `search_queries/{provider}_search_{timestamp}.json`, plus a CSV when
    /// requested.
    pub async fn search(
        &self,
        provider: Provider,
        filter: &SearchFilter,
        options: &SearchOptions,
    ) -> Result<Vec<Entry>, ElsevierError> {
        if filter.has_author_ids() && !provider.supports_author_ids() {
            return Err(ElsevierError::InvalidQuery(format!(
                "{} does not accept author IDs. Provide author names or use Scopus.",
                provider
            )));
        }
        if filter.has_subjects() && !provider.supports_subjects() {
            return Err(ElsevierError::InvalidQuery(format!(
                "{} does not accept the subject query parameter. Use Scopus.",
                provider
            )));
        }

        let mut params = write_query(filter)?;
        tracing::debug!("{} query: {}", provider, params.query());

        let url = self.endpoint(provider.search_path());
        let headers = self.json_headers()?;
        let mut all_entries: Vec<Entry> = Vec::new();

        loop {
            let pairs = params.to_pairs();
            let document = self
                .http
                .fetch(&url, headers.clone(), Some(pairs.as_slice()))
                .await?
                .into_json()?;
            let page = parse_search_page(&document, params.start)?;

            let next_start = page.next_start();
            let raw_len = page.raw_len;
            let page_start = page.start;
            let total = page.total;
            all_entries.extend(page.entries);

            tracing::info!("Fetched {}/{} entries.", next_start.min(total), total);

            if next_start >= total {
                break;
            }
            if raw_len == 0 {
                tracing::warn!(
                    "{} returned an empty page at offset {} of {}; stopping",
                    provider,
                    params.start,
                    total
                );
                break;
            }
            if next_start <= params.start {
                tracing::warn!(
                    "{} reported offset {} after requesting {}; stopping",
                    provider,
                    page_start,
                    params.start
                );
                break;
            }
            if let Some(cap) = options.max_results {
                if all_entries.len() >= cap {
                    break;
                }
            }

            params.start = next_start;
            self.pacer.wait().await;
        }

        let dir = self.layout.search_queries_dir();
        let stem = format!("{}_search_{}", provider.id(), timestamp());

        let json_path = dir.join(format!("{}.json", stem));
        write_json(&json_path, &all_entries)?;
        tracing::info!("Saved {} entries to {}", all_entries.len(), json_path.display());

        if options.save_csv {
            let csv_path = dir.join(format!("{}.csv", stem));
            if write_csv(&csv_path, &all_entries)? {
                tracing::info!("Saved CSV to {}", csv_path.display());
            } else {
                tracing::warn!("No entries to write to {}", csv_path.display());
            }
        }

        Ok(all_entries)
    }
}

//! PlumX policy-citation and news-mention enrichment.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use reqwest::header::HeaderMap;

use super::{ElsevierClient, ElsevierError};
use crate::models::{access_citation_counts, CitationKind, CitationSelector, Entry};
use crate::utils::{timestamp, write_csv};

/// Sort entries descending by policy citations, then news mentions.
///
/// A null counter sorts below every number, independently for each key.
/// Entries with equal keys keep their input order.
pub fn sort_by_counters(entries: &mut [Entry]) {
    entries.sort_by(|a, b| compare_counters(b, a));
}

fn compare_counters(a: &Entry, b: &Entry) -> Ordering {
    // Option orders None below Some, which is the null-as-lowest rule
    a.policy_citation_count()
        .cmp(&b.policy_citation_count())
        .then_with(|| a.news_mentions().cmp(&b.news_mentions()))
}

impl ElsevierClient {
    /// Look up PlumX counters for one DOI
    pub async fn citation_counts(
        &self,
        doi: &str,
        selector: CitationSelector,
    ) -> Result<BTreeMap<CitationKind, Option<u64>>, ElsevierError> {
        let headers = self.json_headers()?;
        self.fetch_counts(doi, selector, &headers).await
    }

    async fn fetch_counts(
        &self,
        doi: &str,
        selector: CitationSelector,
        headers: &HeaderMap,
    ) -> Result<BTreeMap<CitationKind, Option<u64>>, ElsevierError> {
        let url = self.endpoint(&format!("/analytics/plumx/doi/{}", doi));
        let document = self
            .http
            .fetch(&url, headers.clone(), None)
            .await?
            .into_json()?;
        Ok(access_citation_counts(&document, selector))
    }

    /// Attach PlumX counters to every entry, sort, and optionally save CSV.
    ///
    /// Each entry gets `policy_citation_count` and `news_mentions`. Entries
    /// without a DOI, and entries whose lookup fails, get null counters and
    /// stay in the result. Only an [`ElsevierError::InvalidFormat`] response
    /// aborts the run. With `save_to_file` the sorted entries are written to
    /// `search_queries/plumx_output_{timestamp}.csv`.
    pub async fn plumx_metrics(
        &self,
        mut entries: Vec<Entry>,
        save_to_file: bool,
    ) -> Result<Vec<Entry>, ElsevierError> {
        let headers = self.json_headers()?;

        for (i, entry) in entries.iter_mut().enumerate() {
            let Some(doi) = entry.doi().map(str::to_string) else {
                let err = ElsevierError::MissingIdentifier(format!("article no. {} has no DOI", i));
                tracing::warn!("{}", err);
                entry.set_counters(None, None);
                continue;
            };

            let counts = match self.fetch_counts(&doi, CitationSelector::Both, &headers).await {
                Ok(counts) => counts,
                Err(ElsevierError::InvalidFormat(msg)) => {
                    return Err(ElsevierError::InvalidFormat(msg));
                }
                Err(e) => {
                    tracing::warn!("PlumX lookup failed for {}: {}", doi, e);
                    BTreeMap::new()
                }
            };

            let policy = counts.get(&CitationKind::Policy).copied().flatten();
            let news = counts.get(&CitationKind::News).copied().flatten();
            tracing::debug!("{}: policy={:?} news={:?}", doi, policy, news);
            entry.set_counters(policy, news);
        }

        sort_by_counters(&mut entries);

        if save_to_file {
            let path = self
                .layout
                .search_queries_dir()
                .join(format!("plumx_output_{}.csv", timestamp()));
            if write_csv(&path, &entries)? {
                tracing::info!("Saved PlumX metrics to {}", path.display());
            } else {
                tracing::warn!("No entries to write to {}", path.display());
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn entry(id: &str, policy: Option<u64>, news: Option<u64>) -> Entry {
        let mut e = Entry::new().with("id", id);
        e.set_counters(policy, news);
        e
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries
            .iter()
            .map(|e| e.get("id").and_then(Value::as_str).unwrap())
            .collect()
    }

    #[test]
    fn test_sort_policy_then_news() {
        let mut entries = vec![
            entry("a", Some(5), Some(1)),
            entry("b", None, Some(99)),
            entry("c", Some(5), Some(9)),
        ];
        sort_by_counters(&mut entries);
        assert_eq!(ids(&entries), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_null_news_sorts_last_within_policy() {
        let mut entries = vec![
            entry("a", Some(2), None),
            entry("b", Some(2), Some(0)),
            entry("c", Some(3), None),
        ];
        sort_by_counters(&mut entries);
        assert_eq!(ids(&entries), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_null_policy_entries_ordered_by_news() {
        let mut entries = vec![
            entry("a", None, Some(1)),
            entry("b", None, None),
            entry("c", None, Some(4)),
        ];
        sort_by_counters(&mut entries);
        assert_eq!(ids(&entries), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut entries = vec![
            entry("first", Some(1), Some(1)),
            entry("second", Some(1), Some(1)),
        ];
        sort_by_counters(&mut entries);
        assert_eq!(ids(&entries), vec!["first", "second"]);
    }
}

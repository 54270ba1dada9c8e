//! Figure and author-manuscript retrieval for a single article.

use reqwest::header::HeaderMap;
use std::path::{Path, PathBuf};

use super::{ElsevierClient, ElsevierError};
use crate::config::ItemFailurePolicy;
use crate::models::{Entry, ObjectIndex, ObjectKind, ObjectReference};
use crate::utils::{
    datestamp, sanitize_doi, timestamp, unique_path, write_binary, FetchResult,
};

/// Files written for one article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectReport {
    pub doi: String,
    /// High-resolution graphic renderings
    pub graphics: Vec<PathBuf>,
    /// Author-manuscript PDFs
    pub manuscripts: Vec<PathBuf>,
    /// Downloads that failed
    pub failures: usize,
}

impl ObjectReport {
    fn new(doi: &str) -> Self {
        Self {
            doi: doi.to_string(),
            ..Default::default()
        }
    }

    pub fn total_files(&self) -> usize {
        self.graphics.len() + self.manuscripts.len()
    }
}

impl ElsevierClient {
    /// Download the objects of the article an entry describes
    pub async fn retrieve_article_objects(
        &self,
        entry: &Entry,
        save_manuscripts: bool,
    ) -> Result<ObjectReport, ElsevierError> {
        let doi = entry.doi().ok_or_else(|| {
            ElsevierError::MissingIdentifier("DOI not found in article entry".to_string())
        })?;
        self.retrieve_objects(doi, save_manuscripts).await
    }

    /// Download every graphic of an article at high resolution and, when
    /// asked, its author-manuscript PDFs.
    ///
    /// An unreachable or malformed object index is logged and produces an
    /// empty report. Individual download failures follow the client's
    /// [`ItemFailurePolicy`].
    pub async fn retrieve_objects(
        &self,
        doi: &str,
        save_manuscripts: bool,
    ) -> Result<ObjectReport, ElsevierError> {
        let doi = doi.trim();
        if doi.is_empty() {
            return Err(ElsevierError::MissingIdentifier("empty DOI".to_string()));
        }

        let mut report = ObjectReport::new(doi);
        let index_url = self.endpoint(&format!("/content/object/doi/{}", doi));

        let fetched = self
            .http
            .fetch(&index_url, self.json_headers()?, None)
            .await
            .and_then(FetchResult::into_json);
        let document = match fetched {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Trouble executing article retrieval API for {}: {}", doi, e);
                return Ok(report);
            }
        };

        let index = ObjectIndex::from_value(&document).unwrap_or_else(|| {
            let miss = ElsevierError::LookupMiss(format!("no object index for {}", doi));
            tracing::warn!("{}; graphics may not exist", miss);
            ObjectIndex::default()
        });

        let headers = self.binary_headers()?;

        let graphics = index.graphics();
        if graphics.is_empty() {
            tracing::info!("No graphic renderings found for {}", doi);
        }
        let graphics_dir = self.layout.graphic_renderings_dir();
        let stamp = datestamp();
        for graphic in graphics {
            let path = graphics_dir.join(format!(
                "{}_{}_{}.jpg",
                sanitize_doi(doi),
                graphic.reference,
                stamp
            ));
            let ok = self
                .download_one(doi, &index_url, &headers, &graphic, &path, &mut report)
                .await;
            if !ok && self.failure_policy == ItemFailurePolicy::Abort {
                tracing::warn!("Skipping remaining graphics for {}", doi);
                break;
            }
        }

        if save_manuscripts {
            let manuscripts = index.manuscripts();
            if manuscripts.is_empty() {
                tracing::info!("No PDFs found for manuscript: {}", doi);
            }
            let manuscripts_dir = self.layout.author_manuscripts_dir();
            for manuscript in manuscripts {
                // Timestamps repeat within a second; pick a free name per file
                let path =
                    unique_path(&manuscripts_dir.join(format!("manuscript_{}.pdf", timestamp())));
                let ok = self
                    .download_one(doi, &index_url, &headers, &manuscript, &path, &mut report)
                    .await;
                if !ok && self.failure_policy == ItemFailurePolicy::Abort {
                    tracing::warn!("Skipping remaining manuscripts for {}", doi);
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Download one object, recording the outcome in the report
    async fn download_one(
        &self,
        doi: &str,
        index_url: &str,
        headers: &HeaderMap,
        reference: &ObjectReference,
        path: &Path,
        report: &mut ObjectReport,
    ) -> bool {
        match self.fetch_object(index_url, headers, reference, path).await {
            Ok(()) => {
                tracing::info!("Saved {} to {}", reference.reference, path.display());
                match reference.kind {
                    ObjectKind::Graphic => report.graphics.push(path.to_path_buf()),
                    ObjectKind::Manuscript => report.manuscripts.push(path.to_path_buf()),
                }
                true
            }
            Err(e) => {
                tracing::warn!("Could not retrieve {} from {}: {}", reference.reference, doi, e);
                report.failures += 1;
                false
            }
        }
    }

    async fn fetch_object(
        &self,
        index_url: &str,
        headers: &HeaderMap,
        reference: &ObjectReference,
        path: &Path,
    ) -> Result<(), ElsevierError> {
        let url = reference.download_url(index_url).ok_or_else(|| {
            ElsevierError::LookupMiss(format!("no download URL for {}", reference.reference))
        })?;
        let bytes = self
            .http
            .fetch(&url, headers.clone(), None)
            .await?
            .into_bytes()?;
        write_binary(path, &bytes)
    }
}

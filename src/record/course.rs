//! Course page conversion.
//!
//! Scraped course pages become records with the page title as the question
//! and the page body as the answer. The converted snapshot is written once and
//! reused afterwards.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use super::error::{RecordError, RecordResult};
use super::source::RecordSource;
use super::{Record, RecordStore};

/// Attribution given to every course page record.
pub const COURSE_PAGE_AUTHOR: &str = "TDS Course Page";

/// One scraped course page as emitted by the ingestion step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursePage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Converts scraped pages to records, skipping pages without content.
///
/// Every `/../` in a page URL is collapsed to `/`.
pub fn course_pages_to_records(pages: Vec<CoursePage>) -> Vec<Record> {
    pages
        .into_iter()
        .filter_map(|page| {
            let content = page.content.filter(|c| !c.trim().is_empty())?;
            let url = page
                .url
                .filter(|u| !u.is_empty())
                .map(|u| u.replace("/../", "/"));

            Some(Record {
                question: page.title.trim().to_string(),
                answer: content.trim().to_string(),
                answered_by: COURSE_PAGE_AUTHOR.to_string(),
                source_url: url,
            })
        })
        .collect()
}

/// Record source for the course corpus.
///
/// Prefers the filtered snapshot; when it is missing, converts the raw pages
/// and writes the snapshot for next time.
#[derive(Debug, Clone)]
pub struct CoursePageSource {
    raw_pages_path: PathBuf,
    snapshot_path: PathBuf,
}

impl CoursePageSource {
    pub fn new(raw_pages_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_pages_path: raw_pages_path.into(),
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn load_blocking(raw_pages_path: &Path, snapshot_path: &Path) -> RecordResult<RecordStore> {
        if path_exists(snapshot_path)? {
            info!(path = %snapshot_path.display(), "Using cached course snapshot");
            return RecordStore::from_json_file(snapshot_path);
        }

        if !path_exists(raw_pages_path)? {
            warn!(
                path = %raw_pages_path.display(),
                "Raw course pages not found; corpus is empty"
            );
            return Ok(RecordStore::default());
        }

        let bytes = std::fs::read(raw_pages_path).map_err(|e| RecordError::Read {
            path: raw_pages_path.to_path_buf(),
            source: e,
        })?;
        let pages: Vec<CoursePage> =
            serde_json::from_slice(&bytes).map_err(|e| RecordError::Parse {
                origin: raw_pages_path.display().to_string(),
                source: e,
            })?;

        let page_count = pages.len();
        let store = RecordStore::from_records(course_pages_to_records(pages));
        store.save_json(snapshot_path)?;

        info!(
            pages = page_count,
            records = store.len(),
            path = %snapshot_path.display(),
            "Converted course pages to records"
        );
        Ok(store)
    }
}

fn path_exists(path: &Path) -> RecordResult<bool> {
    path.try_exists().map_err(|e| RecordError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

impl RecordSource for CoursePageSource {
    async fn load_records(&self) -> RecordResult<RecordStore> {
        let raw = self.raw_pages_path.clone();
        let snapshot = self.snapshot_path.clone();

        tokio::task::spawn_blocking(move || Self::load_blocking(&raw, &snapshot))
            .await
            .map_err(|e| RecordError::Read {
                path: self.snapshot_path.clone(),
                source: std::io::Error::other(e),
            })?
    }
}

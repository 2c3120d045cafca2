//! Normalized question/answer records and the sources that produce them.
//!
//! Records arrive from the ingestion collaborator as a JSON array. The store
//! normalizes them once on load and is read-only afterwards.

mod course;
pub mod error;
mod source;


pub use course::{COURSE_PAGE_AUTHOR, CoursePage, CoursePageSource, course_pages_to_records};
pub use error::{RecordError, RecordResult};
pub use source::{JsonRecordSource, RecordSource};

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::corpus::TextField;

/// One previously-answered question with provenance.
///
/// Serialized with the ingestion field names (`url` for the source link).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub answered_by: String,
    #[serde(
        rename = "url",
        alias = "source_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_url: Option<String>,
}

impl Record {
    /// Trims the text fields and validates invariants.
    ///
    /// Interior text is kept as-is, so markdown in course pages keeps its
    /// line structure. Returns `None` when the question or answer is blank.
    /// A source URL that is not absolute is dropped.
    pub fn normalized(self) -> Option<Self> {
        if is_blank(&self.question) || is_blank(&self.answer) {
            return None;
        }

        let source_url = self.source_url.and_then(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            match reqwest::Url::parse(trimmed) {
                Ok(url) if url.has_host() => Some(trimmed.to_string()),
                _ => {
                    warn!(url = %trimmed, "Dropping source URL: not an absolute URL");
                    None
                }
            }
        });

        Some(Self {
            question: self.question.trim().to_string(),
            answer: self.answer.trim().to_string(),
            answered_by: self.answered_by.trim().to_string(),
            source_url,
        })
    }
}

fn is_blank(text: &str) -> bool {
    text.split_whitespace().next().is_none()
}

/// Ordered, normalized records of one corpus.
///
/// Iteration order is the row order of the corpus embedding matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Builds a store, normalizing and filtering `records`.
    pub fn from_records(records: Vec<Record>) -> Self {
        let total = records.len();
        let records: Vec<Record> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, r)| {
                let normalized = r.normalized();
                if normalized.is_none() {
                    warn!(index = i, "Dropping record: empty question or answer");
                }
                normalized
            })
            .collect();

        debug!(kept = records.len(), total, "Record store built");
        Self { records }
    }

    /// Parses a JSON array of records.
    pub fn from_json_str(json: &str) -> RecordResult<Self> {
        let records: Vec<Record> =
            serde_json::from_str(json).map_err(|e| RecordError::Parse {
                origin: "<inline>".to_string(),
                source: e,
            })?;
        Ok(Self::from_records(records))
    }

    /// Reads and parses a JSON array of records from `path`.
    pub fn from_json_file(path: &Path) -> RecordResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| RecordError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let records: Vec<Record> =
            serde_json::from_slice(&bytes).map_err(|e| RecordError::Parse {
                origin: path.display().to_string(),
                source: e,
            })?;
        Ok(Self::from_records(records))
    }

    /// Writes the store as pretty-printed JSON (via a temp file + rename).
    pub fn save_json(&self, path: &Path) -> RecordResult<()> {
        let write_err = |e: std::io::Error| RecordError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_vec_pretty(&self.records).map_err(RecordError::Encode)?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json).map_err(write_err)?;
        std::fs::rename(&temp_path, path).map_err(write_err)?;
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Designated texts in record order.
    pub fn texts(&self, field: TextField) -> Vec<&str> {
        self.records.iter().map(|r| field.of(r)).collect()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::RecordStore;
use super::error::{RecordError, RecordResult};

/// Produces the records of one corpus.
///
/// This is the seam to the ingestion collaborator. A source with nothing to
/// offer returns an empty store rather than an error.
pub trait RecordSource: Send + Sync {
    fn load_records(&self) -> impl Future<Output = RecordResult<RecordStore>> + Send;
}

impl RecordSource for RecordStore {
    async fn load_records(&self) -> RecordResult<RecordStore> {
        Ok(self.clone())
    }
}

/// Reads a normalized JSON snapshot written by the ingestion step.
#[derive(Debug, Clone)]
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonRecordSource {
    async fn load_records(&self) -> RecordResult<RecordStore> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| RecordError::Read {
                path: self.path.clone(),
                source: e,
            })?;
        if !exists {
            warn!(path = %self.path.display(), "Record snapshot not found; corpus is empty");
            return Ok(RecordStore::default());
        }

        let path = self.path.clone();
        let store = tokio::task::spawn_blocking(move || RecordStore::from_json_file(&path))
            .await
            .map_err(|e| RecordError::Read {
                path: self.path.clone(),
                source: std::io::Error::other(e),
            })??;

        info!(
            path = %self.path.display(),
            records = store.len(),
            "Loaded record snapshot"
        );
        Ok(store)
    }
}

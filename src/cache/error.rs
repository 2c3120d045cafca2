use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::storage::StorageError;

/// The persisted artifact exists but cannot be used.
///
/// Never repaired automatically; delete the artifact (or rebuild) to recover.
#[derive(Debug, Error)]
#[error("embedding cache at {path} is corrupt: {reason}")]
pub struct CacheCorruptError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Corrupt(#[from] CacheCorruptError),

    #[error("no embedding cache at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to embed corpus: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding cache storage error: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for CacheError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { path } => CacheError::NotFound { path },
            StorageError::Corrupt { path, reason } => {
                CacheError::Corrupt(CacheCorruptError { path, reason })
            }
            other => CacheError::Storage(other),
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

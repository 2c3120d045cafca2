use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read records from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write records to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a JSON array of the expected shape.
    #[error("malformed record JSON in {origin}: {source}")]
    Parse {
        /// File path, or `<inline>` for in-memory input.
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode records: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;

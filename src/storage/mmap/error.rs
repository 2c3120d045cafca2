use std::io;
use thiserror::Error;

/// Failures mapping or decoding a matrix artifact.
#[derive(Error, Debug)]
pub enum MmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("matrix artifact is empty")]
    EmptyFile,

    #[error("matrix artifact failed validation: {0}")]
    ValidationFailed(String),

    #[error("matrix bytes at offset {offset} are not {alignment}-byte aligned")]
    AlignmentError { offset: usize, alignment: usize },
}

pub type MmapResult<T> = Result<T, MmapError>;

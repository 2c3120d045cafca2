//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A boolean variable was not one of the accepted spellings.
    #[error("failed to parse {name}='{value}': expected true/false/1/0")]
    InvalidBool { name: &'static str, value: String },

    /// Threshold is outside the cosine range or not finite.
    #[error("invalid threshold {value}: must be a finite number in [-1, 1]")]
    InvalidThreshold { value: f32 },

    /// A size limit that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroLimit { name: &'static str },

    /// The batch budget cannot hold even one maximum-size text.
    #[error("batch budget {batch} is smaller than the per-text cap {text}")]
    BatchBudgetTooSmall { batch: usize, text: usize },

    /// Base URL is not an absolute http(s) URL.
    #[error("invalid embedding base URL '{value}'")]
    InvalidBaseUrl { value: String },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

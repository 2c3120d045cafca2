use thiserror::Error;

/// Errors raised while turning text into embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The provider answered with a non-success status.
    #[error("embedding provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response did not line up with the request.
    #[error("malformed embedding response: {reason}")]
    MalformedResponse { reason: String },

    /// The client could not be constructed from the given settings.
    #[error("invalid embedding client configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EmbeddingError {
    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            EmbeddingError::Provider { status, .. } => Some(*status),
            EmbeddingError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

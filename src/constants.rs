//! Centralized constants for retrieval, batching and embedding validation.
//!
//! Batching and ranking defaults live here so the config layer, the batch
//! client and the façade agree on a single value.

/// Default embedding model requested from the provider.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://aiproxy.sanand.workers.dev/openai/v1";

/// Maximum characters of a single text submitted for embedding.
///
/// Longer texts are truncated silently; only the prefix is embedded.
pub const MAX_CHARS_PER_TEXT: usize = 2000;

/// Maximum summed characters of one provider request.
pub const MAX_CHARS_PER_BATCH: usize = 10_000;

/// Default number of matches returned per query.
pub const DEFAULT_TOP_N: usize = 1;

/// Default minimum cosine similarity (inclusive).
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Upper bound on candidates handed to the answer generator.
pub const MAX_CONTEXT_CANDIDATES: usize = 3;

/// Characters of a forum question kept when it is used as generator context.
pub const CONTEXT_QUESTION_CHARS: usize = 1500;

/// Marker appended to a truncated context question.
pub const CONTEXT_CONTINUED_SUFFIX: &str = "....continued";

/// Default provider request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that every vector in `vectors` has the same non-zero dimension.
///
/// Returns that dimension, or `0` when `vectors` is empty.
///
/// # Example
///
/// ```
/// use retrieval::constants::validate_uniform_dim;
///
/// let vectors = vec![vec![0.1, 0.2], vec![0.3, 0.4]];
/// assert_eq!(validate_uniform_dim(&vectors).unwrap(), 2);
/// ```
pub fn validate_uniform_dim(vectors: &[Vec<f32>]) -> Result<usize, DimValidationError> {
    let Some(first) = vectors.first() else {
        return Ok(0);
    };

    let expected = first.len();
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }

    for v in vectors {
        validate_embedding_dim(v.len(), expected)?;
    }

    Ok(expected)
}

/// Validates that a runtime embedding dimension matches the expected dimension.
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

use thiserror::Error;

use crate::cache::CacheError;
use crate::constants::DimValidationError;
use crate::corpus::Corpus;
use crate::embedding::EmbeddingError;
use crate::record::RecordError;

/// Failure of a retrieval request. Component errors pass through unchanged.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to load records: {0}")]
    Records(#[from] RecordError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("failed to embed query: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The query vector cannot be compared with the cached matrix, usually
    /// because the embedding model changed after the cache was built.
    #[error("query embedding does not fit the {corpus} cache: {source}")]
    QueryDimension {
        corpus: Corpus,
        #[source]
        source: DimValidationError,
    },
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;

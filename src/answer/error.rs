use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum AnswerError {
    /// The question itself could not be embedded.
    #[error("failed to embed question: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// The answer generator failed to produce a reply.
    #[error("answer generator failed: {reason}")]
    Generator { reason: String },
}

pub type AnswerResult<T> = Result<T, AnswerError>;

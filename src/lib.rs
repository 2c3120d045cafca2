//! Retrieval core for a course Q&A assistant.
//!
//! Finds the previously-answered forum post or course page most similar to a
//! student's question, so an answer generator can build on it.
//!
//! # Public API Surface
//!
//! ## Records
//! - [`Record`], [`RecordStore`] - Normalized question/answer records
//! - [`RecordSource`], [`JsonRecordSource`], [`CoursePageSource`] - Where a corpus' records come from
//! - [`Corpus`], [`TextField`] - The two corpora and the field each one embeds
//!
//! ## Embeddings
//! - [`EmbeddingProvider`], [`OpenAiProvider`] - One request to an embedding service
//! - [`BatchEmbedder`] - Truncation and budgeted batching over a provider
//! - [`EmbeddingCache`] - Persisted per-corpus embedding matrix
//!
//! ## Retrieval
//! - [`SimilarityRanker`], [`cosine_similarity`] - Cosine ranking with top-n and threshold
//! - [`Retriever`], [`RankedMatch`] - Per-corpus retrieval façade
//! - [`Assistant`], [`AnswerGenerator`] - Forum-then-course answering
//!
//! ## Configuration
//! - [`Config`], [`ConfigError`] - `TA_*` environment configuration
//!
//! ## Test/Mock Support
//! [`MockEmbeddingProvider`] and [`MockAnswerGenerator`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod cache;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod hashing;
pub mod ranking;
pub mod record;
pub mod retrieval;
pub mod storage;

pub use answer::{
    Answer, AnswerError, AnswerGenerator, AnswerResult, Assistant, ContextCandidate,
    GeneratedAnswer, Link, Relevance, parse_reply,
};
#[cfg(any(test, feature = "mock"))]
pub use answer::{GeneratorCall, MockAnswerGenerator};
pub use cache::{CacheCorruptError, CacheError, CacheResult, EmbeddingCache};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use corpus::{Corpus, TextField};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingProvider;
pub use embedding::{
    BatchEmbedder, EmbeddingError, EmbeddingProvider, EmbeddingResult, OpenAiProvider,
};
pub use hashing::{fingerprint_texts, hash_text};
pub use ranking::{RankedIndex, RankerConfig, SimilarityRanker, cosine_similarity};
pub use record::{
    CoursePage, CoursePageSource, JsonRecordSource, Record, RecordError, RecordSource,
    RecordStore,
};
pub use retrieval::{CorpusSnapshot, RankedMatch, RetrievalError, RetrievalResult, Retriever};
pub use storage::{EmbeddingMatrix, StorageError};

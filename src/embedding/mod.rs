//! Text embedding.
//!
//! - [`EmbeddingProvider`] is one round-trip to an embedding service.
//! - [`BatchEmbedder`] prepares texts, splits them into budgeted requests and
//!   stitches the results back into input order.

mod batch;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod openai;

#[cfg(test)]
mod tests;

pub use batch::{plan_batches, prepare_text};
pub use error::{EmbeddingError, EmbeddingResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_EMBEDDING_DIM, MOCK_MODEL, MockEmbeddingProvider, bag_of_words};
pub use openai::OpenAiProvider;

use std::future::Future;

use tracing::debug;

use crate::config::Config;
use crate::constants::{MAX_CHARS_PER_BATCH, MAX_CHARS_PER_TEXT, validate_uniform_dim};

/// A service that embeds a list of texts in one request.
///
/// Implementations return exactly one vector per input, in input order.
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier recorded alongside persisted embeddings.
    fn model(&self) -> &str;

    fn embed(
        &self,
        inputs: &[String],
    ) -> impl Future<Output = EmbeddingResult<Vec<Vec<f32>>>> + Send;
}

/// Batching front-end over an [`EmbeddingProvider`].
#[derive(Debug, Clone)]
pub struct BatchEmbedder<P> {
    provider: P,
    max_chars_per_text: usize,
    max_chars_per_batch: usize,
}

impl<P: EmbeddingProvider> BatchEmbedder<P> {
    /// Uses the default limits (2000 characters per text, 10000 per request).
    pub fn new(provider: P) -> Self {
        Self::with_limits(provider, MAX_CHARS_PER_TEXT, MAX_CHARS_PER_BATCH)
    }

    pub fn with_limits(provider: P, max_chars_per_text: usize, max_chars_per_batch: usize) -> Self {
        Self {
            provider,
            max_chars_per_text,
            max_chars_per_batch,
        }
    }

    pub fn from_config(provider: P, config: &Config) -> Self {
        Self::with_limits(
            provider,
            config.max_chars_per_text,
            config.max_chars_per_batch,
        )
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// The exact text submitted for `text`: trimmed and length-capped.
    pub fn prepare(&self, text: &str) -> String {
        prepare_text(text, self.max_chars_per_text)
    }

    /// Embeds `texts`, returning one vector per text in the same order.
    ///
    /// The first failing request aborts the rest; nothing is returned from
    /// requests that already succeeded.
    pub async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prepared: Vec<String> = texts.iter().map(|t| self.prepare(t)).collect();
        let plan = plan_batches(&prepared, self.max_chars_per_batch);
        let mut embeddings = Vec::with_capacity(prepared.len());

        for (batch_num, range) in plan.iter().enumerate() {
            let inputs = &prepared[range.clone()];
            debug!(
                batch = batch_num,
                of = plan.len(),
                inputs = inputs.len(),
                chars = inputs.iter().map(|t| t.chars().count()).sum::<usize>(),
                "Sending embedding batch"
            );

            let vectors = self.provider.embed(inputs).await?;
            if vectors.len() != inputs.len() {
                return Err(EmbeddingError::MalformedResponse {
                    reason: format!(
                        "batch {} returned {} embeddings for {} inputs",
                        batch_num,
                        vectors.len(),
                        inputs.len()
                    ),
                });
            }
            embeddings.extend(vectors);
        }

        validate_uniform_dim(&embeddings).map_err(|e| EmbeddingError::MalformedResponse {
            reason: e.to_string(),
        })?;

        Ok(embeddings)
    }

    /// Embeds a single text as a one-item batch.
    pub async fn embed_one(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors.pop().ok_or_else(|| EmbeddingError::MalformedResponse {
            reason: "no embedding returned for query".to_string(),
        })
    }
}

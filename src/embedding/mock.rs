//! Scriptable in-process embedding provider.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::EmbeddingProvider;
use super::error::{EmbeddingError, EmbeddingResult};
use crate::hashing::hash_text;

pub const MOCK_EMBEDDING_DIM: usize = 16;
pub const MOCK_MODEL: &str = "mock-embedding";

type EmbedFn = dyn Fn(&str) -> Vec<f32> + Send + Sync;

struct MockState {
    embed_fn: Box<EmbedFn>,
    overrides: Mutex<HashMap<String, Vec<f32>>>,
    batches: Mutex<Vec<Vec<String>>>,
    failure: Mutex<Option<(usize, u16, String)>>,
}

/// Deterministic provider that records every request it receives.
///
/// The default embedding hashes lowercase words into [`MOCK_EMBEDDING_DIM`]
/// buckets, so texts sharing words score high under cosine similarity.
/// Clones share state, which lets a test keep a handle for assertions after
/// moving the provider into an embedder.
#[derive(Clone)]
pub struct MockEmbeddingProvider {
    state: Arc<MockState>,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::with_fn(bag_of_words)
    }
}

impl std::fmt::Debug for MockEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbeddingProvider")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `f` to embed every input.
    pub fn with_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Vec<f32> + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(MockState {
                embed_fn: Box::new(f),
                overrides: Mutex::new(HashMap::new()),
                batches: Mutex::new(Vec::new()),
                failure: Mutex::new(None),
            }),
        }
    }

    /// Pins the vector returned for an exact input text.
    pub fn set_embedding(&self, text: &str, vector: Vec<f32>) {
        self.state.overrides.lock().insert(text.to_string(), vector);
    }

    /// Makes every call numbered `call_index` (zero-based) or later fail.
    pub fn fail_from_call(&self, call_index: usize, status: u16, message: &str) {
        *self.state.failure.lock() = Some((call_index, status, message.to_string()));
    }

    pub fn clear_failure(&self) {
        *self.state.failure.lock() = None;
    }

    /// Number of `embed` calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.state.batches.lock().len()
    }

    /// Inputs of every call, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.state.batches.lock().clone()
    }

    pub fn total_inputs(&self) -> usize {
        self.state.batches.lock().iter().map(Vec::len).sum()
    }

    pub fn reset_calls(&self) {
        self.state.batches.lock().clear();
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.state.overrides.lock().get(text) {
            return v.clone();
        }
        (self.state.embed_fn)(text)
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    fn model(&self) -> &str {
        MOCK_MODEL
    }

    async fn embed(&self, inputs: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let call_index = {
            let mut batches = self.state.batches.lock();
            batches.push(inputs.to_vec());
            batches.len() - 1
        };

        if let Some((from, status, message)) = self.state.failure.lock().clone()
            && call_index >= from
        {
            return Err(EmbeddingError::Provider { status, message });
        }

        Ok(inputs.iter().map(|text| self.vector_for(text)).collect())
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "can", "do", "does", "for", "how", "i", "in", "is", "it", "my",
    "of", "the", "to", "use", "what", "with",
];

/// Hashes lowercase alphanumeric words into fixed buckets, skipping stop words.
pub fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; MOCK_EMBEDDING_DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        if STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        let bucket = hash_text(&word)[0] as usize % MOCK_EMBEDDING_DIM;
        vector[bucket] += 1.0;
    }
    vector
}

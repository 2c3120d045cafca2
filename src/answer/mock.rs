use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{AnswerError, AnswerResult};
use super::{AnswerGenerator, ContextCandidate};
use crate::corpus::Corpus;

/// One recorded [`AnswerGenerator::generate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorCall {
    pub corpus: Corpus,
    pub question: String,
    pub context: Vec<ContextCandidate>,
}

#[derive(Default)]
struct MockState {
    replies: HashMap<Corpus, Result<String, String>>,
    calls: Vec<GeneratorCall>,
}

/// Generator with a fixed reply per corpus.
///
/// Corpora without a scripted reply answer with the `"error"` sentinel.
#[derive(Clone, Default)]
pub struct MockAnswerGenerator {
    state: Arc<Mutex<MockState>>,
}

impl MockAnswerGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, corpus: Corpus, raw: &str) -> Self {
        self.state.lock().replies.insert(corpus, Ok(raw.to_string()));
        self
    }

    pub fn fail(self, corpus: Corpus, reason: &str) -> Self {
        self.state
            .lock()
            .replies
            .insert(corpus, Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.state.lock().calls.clone()
    }
}

impl AnswerGenerator for MockAnswerGenerator {
    async fn generate(
        &self,
        corpus: Corpus,
        question: &str,
        context: &[ContextCandidate],
    ) -> AnswerResult<String> {
        let mut state = self.state.lock();
        state.calls.push(GeneratorCall {
            corpus,
            question: question.to_string(),
            context: context.to_vec(),
        });

        match state.replies.get(&corpus) {
            Some(Ok(raw)) => Ok(raw.clone()),
            Some(Err(reason)) => Err(AnswerError::Generator {
                reason: reason.clone(),
            }),
            None => Ok(r#"{"answer": "error", "relevant": "error"}"#.to_string()),
        }
    }
}

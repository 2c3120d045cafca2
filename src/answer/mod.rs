//! Question answering over both corpora.
//!
//! The [`Assistant`] embeds a question once, then asks the forum corpus and
//! the course corpus in turn. For each corpus with matches, an
//! [`AnswerGenerator`] writes an answer from the matched records and names the
//! one it relied on; that record becomes the answer's link. If neither corpus
//! yields a relevant record the assistant returns `None` and the caller falls
//! back to its generic response.

mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod reply;


pub use error::{AnswerError, AnswerResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{GeneratorCall, MockAnswerGenerator};
pub use reply::{GeneratedAnswer, Relevance, parse_reply};

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::{CONTEXT_CONTINUED_SUFFIX, CONTEXT_QUESTION_CHARS, MAX_CONTEXT_CANDIDATES};
use crate::corpus::Corpus;
use crate::embedding::{BatchEmbedder, EmbeddingProvider};
use crate::ranking::RankerConfig;
use crate::record::RecordSource;
use crate::retrieval::{RankedMatch, Retriever};

/// One matched record as shown to the generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextCandidate {
    pub question: String,
    pub answer: String,
    pub url: Option<String>,
    pub score: f32,
}

impl ContextCandidate {
    /// Forum questions are cut to a fixed length and marked as continued.
    pub fn from_match(corpus: Corpus, m: &RankedMatch) -> Self {
        let question = match corpus {
            Corpus::Forum => {
                let mut q: String = m.record.question.chars().take(CONTEXT_QUESTION_CHARS).collect();
                q.push_str(CONTEXT_CONTINUED_SUFFIX);
                q
            }
            Corpus::Course => m.record.question.clone(),
        };
        Self {
            question,
            answer: m.record.answer.clone(),
            url: m.record.source_url.clone(),
            score: m.score,
        }
    }
}

/// Writes an answer from a question and its context candidates.
///
/// The reply is the generator's raw text; see [`parse_reply`] for the
/// expected shape.
pub trait AnswerGenerator: Send + Sync {
    fn generate(
        &self,
        corpus: Corpus,
        question: &str,
        context: &[ContextCandidate],
    ) -> impl Future<Output = AnswerResult<String>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: Option<String>,
    pub text: String,
}

/// Final answer with the record it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub links: Vec<Link>,
    #[serde(skip)]
    pub corpus: Corpus,
}

/// Forum-then-course answering pipeline.
pub struct Assistant<F, C, P, G> {
    forum: Retriever<F, P>,
    course: Retriever<C, P>,
    embedder: Arc<BatchEmbedder<P>>,
    generator: G,
    ranker: RankerConfig,
}

impl<F, C, P, G> Assistant<F, C, P, G>
where
    F: RecordSource,
    C: RecordSource,
    P: EmbeddingProvider,
    G: AnswerGenerator,
{
    /// Both retrievers should share `embedder` so the question is embedded
    /// the same way for each corpus.
    pub fn new(
        forum: Retriever<F, P>,
        course: Retriever<C, P>,
        embedder: Arc<BatchEmbedder<P>>,
        generator: G,
    ) -> Self {
        let ranker = *forum.ranker();
        Self {
            forum,
            course,
            embedder,
            generator,
            ranker,
        }
        .with_ranker(ranker)
    }

    /// Ranking used for both corpora. At most three candidates are passed on.
    pub fn with_ranker(mut self, ranker: RankerConfig) -> Self {
        self.ranker = RankerConfig {
            top_n: ranker.top_n.min(MAX_CONTEXT_CANDIDATES),
            ..ranker
        };
        self
    }

    pub fn forum(&self) -> &Retriever<F, P> {
        &self.forum
    }

    pub fn course(&self) -> &Retriever<C, P> {
        &self.course
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Prepares both corpora. Failures are returned, not logged.
    pub async fn prepare(&self) -> AnswerResult<()> {
        self.forum.prepare().await?;
        self.course.prepare().await?;
        Ok(())
    }

    /// Answers `question`, or `None` when no corpus has a relevant record.
    ///
    /// The course corpus is only loaded when the forum has no answer. The
    /// question is embedded at most once. A corpus that fails to load or
    /// whose generator call fails is logged and skipped. Only a failure to
    /// embed the question is returned.
    pub async fn answer(&self, question: &str) -> AnswerResult<Option<Answer>> {
        let mut query_vector: Option<Vec<f32>> = None;

        if ready(&self.forum).await {
            let vector = self.embed_question(&mut query_vector, question).await?;
            match self.consult(&self.forum, question, vector).await {
                Ok(Some(answer)) => return Ok(Some(answer)),
                Ok(None) => {}
                Err(e) => warn!(corpus = %Corpus::Forum, error = %e, "Corpus skipped"),
            }
        }

        if ready(&self.course).await {
            let vector = self.embed_question(&mut query_vector, question).await?;
            match self.consult(&self.course, question, vector).await {
                Ok(Some(answer)) => return Ok(Some(answer)),
                Ok(None) => {}
                Err(e) => warn!(corpus = %Corpus::Course, error = %e, "Corpus skipped"),
            }
        }

        if query_vector.is_none() {
            info!("No corpus available; deferring to fallback");
        } else {
            info!("No relevant record in any corpus; deferring to fallback");
        }
        Ok(None)
    }

    async fn embed_question<'a>(
        &self,
        slot: &'a mut Option<Vec<f32>>,
        question: &str,
    ) -> AnswerResult<&'a [f32]> {
        if slot.is_none() {
            *slot = Some(self.embedder.embed_one(question).await?);
        }
        Ok(slot.get_or_insert_with(Vec::new).as_slice())
    }

    async fn consult<S: RecordSource>(
        &self,
        retriever: &Retriever<S, P>,
        question: &str,
        query_vector: &[f32],
    ) -> AnswerResult<Option<Answer>> {
        let corpus = retriever.corpus();
        let matches = retriever
            .retrieve_with_vector(query_vector, self.ranker)
            .await?;
        if matches.is_empty() {
            debug!(corpus = %corpus, "No matches above threshold");
            return Ok(None);
        }

        let context: Vec<ContextCandidate> = matches
            .iter()
            .map(|m| ContextCandidate::from_match(corpus, m))
            .collect();

        let raw = self.generator.generate(corpus, question, &context).await?;
        let reply = parse_reply(&raw);

        let Some(index) = reply.relevance.resolve(matches.len()) else {
            debug!(corpus = %corpus, relevance = ?reply.relevance, "Generator found no relevant candidate");
            return Ok(None);
        };

        let record = &matches[index].record;
        let text = match corpus {
            Corpus::Forum => record.answer.clone(),
            Corpus::Course => record.question.clone(),
        };

        info!(corpus = %corpus, candidate = index + 1, score = matches[index].score, "Answered from corpus");
        Ok(Some(Answer {
            answer: reply.answer,
            links: vec![Link {
                url: record.source_url.clone(),
                text,
            }],
            corpus,
        }))
    }
}

/// Whether `retriever` has anything to rank. Load failures are logged.
async fn ready<S, P>(retriever: &Retriever<S, P>) -> bool
where
    S: RecordSource,
    P: EmbeddingProvider,
{
    match retriever.prepare().await {
        Ok(snapshot) => !snapshot.is_empty(),
        Err(e) => {
            warn!(corpus = %retriever.corpus(), error = %e, "Corpus unavailable");
            false
        }
    }
}

//! Per-corpus retrieval: records + cached embeddings + ranking.
//!
//! A [`Retriever`] is created once per corpus and shared. The first request
//! (or an explicit [`Retriever::prepare`]) loads the records and their
//! embedding matrix; every later request only reads that snapshot.

mod error;


pub use error::{RetrievalError, RetrievalResult};

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::cache::EmbeddingCache;
use crate::config::Config;
use crate::constants::validate_embedding_dim;
use crate::corpus::Corpus;
use crate::embedding::{BatchEmbedder, EmbeddingProvider};
use crate::ranking::{RankerConfig, SimilarityRanker};
use crate::record::{Record, RecordSource, RecordStore};
use crate::storage::EmbeddingMatrix;

/// A record returned for a query, with its cosine score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub record: Record,
    pub score: f32,
}

/// Records and their embeddings, aligned by position.
#[derive(Debug)]
pub struct CorpusSnapshot {
    records: RecordStore,
    matrix: EmbeddingMatrix,
}

impl CorpusSnapshot {
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    /// Number of rankable records.
    pub fn len(&self) -> usize {
        self.records.len().min(self.matrix.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Retrieval façade for one corpus.
pub struct Retriever<S, P> {
    corpus: Corpus,
    source: S,
    cache: EmbeddingCache,
    embedder: Arc<BatchEmbedder<P>>,
    ranker: SimilarityRanker,
    force_rebuild: bool,
    snapshot: OnceCell<Arc<CorpusSnapshot>>,
}

impl<S, P> std::fmt::Debug for Retriever<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("corpus", &self.corpus)
            .field("cache", &self.cache.matrix_path())
            .field("ranker", &self.ranker)
            .field("prepared", &self.snapshot.initialized())
            .finish()
    }
}

impl<S, P> Retriever<S, P>
where
    S: RecordSource,
    P: EmbeddingProvider,
{
    pub fn new(
        corpus: Corpus,
        source: S,
        cache: EmbeddingCache,
        embedder: Arc<BatchEmbedder<P>>,
    ) -> Self {
        Self {
            corpus,
            source,
            cache,
            embedder,
            ranker: SimilarityRanker::default(),
            force_rebuild: false,
            snapshot: OnceCell::new(),
        }
    }

    /// Retriever using the cache location, ranking defaults and rebuild flag
    /// from `config`.
    pub fn from_config(
        config: &Config,
        corpus: Corpus,
        source: S,
        embedder: Arc<BatchEmbedder<P>>,
    ) -> Self {
        Self::new(
            corpus,
            source,
            EmbeddingCache::from_config(config, corpus),
            embedder,
        )
        .with_ranker(RankerConfig::new(config.top_n, config.threshold))
        .with_force_rebuild(config.force_rebuild)
    }

    pub fn with_ranker(mut self, ranker: RankerConfig) -> Self {
        self.ranker = SimilarityRanker::with_config(ranker);
        self
    }

    /// Discard any persisted embeddings the first time the corpus is prepared.
    pub fn with_force_rebuild(mut self, force_rebuild: bool) -> Self {
        self.force_rebuild = force_rebuild;
        self
    }

    pub fn corpus(&self) -> Corpus {
        self.corpus
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn ranker(&self) -> &RankerConfig {
        self.ranker.config()
    }

    pub fn embedder(&self) -> &Arc<BatchEmbedder<P>> {
        &self.embedder
    }

    /// Loads records and embeddings, building the cache if needed.
    ///
    /// Runs once; concurrent callers wait for the same load. A failed load is
    /// not remembered, so the next call tries again.
    pub async fn prepare(&self) -> RetrievalResult<Arc<CorpusSnapshot>> {
        self.snapshot
            .get_or_try_init(|| self.load_snapshot())
            .await
            .cloned()
    }

    async fn load_snapshot(&self) -> RetrievalResult<Arc<CorpusSnapshot>> {
        let records = self.source.load_records().await?;

        let matrix = if self.force_rebuild {
            self.cache.rebuild(&records, &*self.embedder).await?
        } else {
            self.cache.build(&records, &*self.embedder).await?
        };

        if matrix.len() != records.len() {
            warn!(
                corpus = %self.corpus,
                records = records.len(),
                rows = matrix.len(),
                "Record and embedding counts differ"
            );
        }

        let snapshot = CorpusSnapshot { records, matrix };
        info!(
            corpus = %self.corpus,
            records = snapshot.len(),
            "Corpus ready for retrieval"
        );
        Ok(Arc::new(snapshot))
    }

    /// Best matches for `query` with the configured ranking.
    pub async fn retrieve(&self, query: &str) -> RetrievalResult<Vec<RankedMatch>> {
        self.retrieve_with(query, *self.ranker.config()).await
    }

    /// Best matches for `query` with per-call ranking settings.
    ///
    /// An empty corpus returns no matches without embedding the query.
    pub async fn retrieve_with(
        &self,
        query: &str,
        ranker: RankerConfig,
    ) -> RetrievalResult<Vec<RankedMatch>> {
        let snapshot = self.prepare().await?;
        if snapshot.is_empty() {
            debug!(corpus = %self.corpus, "Empty corpus; no matches");
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_one(query).await?;
        self.rank_snapshot(&snapshot, &query_vector, ranker)
    }

    /// Ranks an already-embedded query against this corpus.
    pub async fn retrieve_with_vector(
        &self,
        query_vector: &[f32],
        ranker: RankerConfig,
    ) -> RetrievalResult<Vec<RankedMatch>> {
        let snapshot = self.prepare().await?;
        self.rank_snapshot(&snapshot, query_vector, ranker)
    }

    /// Fails with [`RetrievalError::QueryDimension`] when a non-empty corpus
    /// was embedded at a different dimension than `query_vector`.
    fn rank_snapshot(
        &self,
        snapshot: &CorpusSnapshot,
        query_vector: &[f32],
        ranker: RankerConfig,
    ) -> RetrievalResult<Vec<RankedMatch>> {
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        validate_embedding_dim(query_vector.len(), snapshot.matrix.dim()).map_err(|source| {
            RetrievalError::QueryDimension {
                corpus: self.corpus,
                source,
            }
        })?;

        let rows = snapshot.matrix.iter_rows().take(snapshot.len());
        let ranked = SimilarityRanker::with_config(ranker).rank(query_vector, rows);

        let matches: Vec<RankedMatch> = ranked
            .into_iter()
            .filter_map(|r| {
                snapshot.records.get(r.index).map(|record| RankedMatch {
                    record: record.clone(),
                    score: r.score,
                })
            })
            .collect();

        debug!(
            corpus = %self.corpus,
            matches = matches.len(),
            best = matches.first().map(|m| m.score),
            "Retrieval ranked"
        );
        Ok(matches)
    }
}

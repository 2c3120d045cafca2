//! Per-corpus embedding cache.
//!
//! Each corpus keeps two files under its directory:
//!
//! - `embeddings.rkyv`: the authoritative row-per-record matrix.
//! - `embeddings.json`: a `text -> vector` mirror keyed by the exact text
//!   that was embedded.
//!
//! The cache is all-or-nothing. If the matrix exists it is used as-is;
//! otherwise the whole corpus is embedded and written. Nothing is updated
//! incrementally.

mod error;


pub use error::{CacheCorruptError, CacheError, CacheResult};

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::corpus::Corpus;
use crate::embedding::{BatchEmbedder, EmbeddingError, EmbeddingProvider};
use crate::hashing::{fingerprint_texts, short_hex};
use crate::record::RecordStore;
use crate::storage::{self, EmbeddingMatrix, EmbeddingMirror, StorageError};

pub const MATRIX_FILE_NAME: &str = "embeddings.rkyv";
pub const MIRROR_FILE_NAME: &str = "embeddings.json";

/// Embedding cache for one corpus.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    corpus: Corpus,
    matrix_path: PathBuf,
    mirror_path: PathBuf,
}

impl EmbeddingCache {
    /// Cache rooted at `dir` (usually `<data_dir>/<corpus id>`).
    pub fn new(corpus: Corpus, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            corpus,
            matrix_path: dir.join(MATRIX_FILE_NAME),
            mirror_path: dir.join(MIRROR_FILE_NAME),
        }
    }

    pub fn from_config(config: &Config, corpus: Corpus) -> Self {
        Self::new(corpus, config.corpus_dir(corpus))
    }

    pub fn corpus(&self) -> Corpus {
        self.corpus
    }

    pub fn matrix_path(&self) -> &Path {
        &self.matrix_path
    }

    pub fn mirror_path(&self) -> &Path {
        &self.mirror_path
    }

    /// Whether a persisted matrix is present. Says nothing about validity.
    pub fn exists(&self) -> bool {
        self.matrix_path.exists()
    }

    /// Loads the persisted matrix.
    ///
    /// # Errors
    /// [`CacheError::NotFound`] when absent, [`CacheError::Corrupt`] when the
    /// file is not a homogeneous numeric matrix.
    pub fn load(&self) -> CacheResult<EmbeddingMatrix> {
        let matrix = storage::read_matrix(&self.matrix_path)?;
        info!(
            corpus = %self.corpus,
            rows = matrix.len(),
            dim = matrix.dim(),
            model = %matrix.model,
            "Loaded embedding cache"
        );
        Ok(matrix)
    }

    /// Returns the matrix for `records`, embedding them only if no matrix is
    /// persisted yet.
    ///
    /// Row `i` is the embedding of record `i`'s designated text. An existing
    /// matrix is trusted even if the records have changed since it was built;
    /// that case is logged. An empty store yields an empty matrix, with no
    /// provider call and nothing written.
    pub async fn build<P: EmbeddingProvider>(
        &self,
        records: &RecordStore,
        embedder: &BatchEmbedder<P>,
    ) -> CacheResult<EmbeddingMatrix> {
        let texts = records.texts(self.corpus.designated_field());
        let prepared: Vec<String> = texts.iter().map(|t| embedder.prepare(t)).collect();
        let fingerprint = fingerprint_texts(prepared.iter().map(String::as_str));

        if self.exists() {
            let matrix = self.load()?;
            self.check_freshness(&matrix, records.len(), &fingerprint, embedder.model());
            return Ok(matrix);
        }

        if records.is_empty() {
            info!(corpus = %self.corpus, "No records; skipping embedding build");
            return Ok(EmbeddingMatrix::empty(fingerprint, embedder.model()));
        }

        info!(
            corpus = %self.corpus,
            records = records.len(),
            field = ?self.corpus.designated_field(),
            "Building embedding cache"
        );

        let vectors = embedder.embed_batch(&texts).await?;
        let mirror: EmbeddingMirror = prepared
            .into_iter()
            .zip(vectors.iter().cloned())
            .collect();

        let matrix = EmbeddingMatrix::from_rows(vectors, fingerprint, embedder.model()).map_err(
            |e| EmbeddingError::MalformedResponse {
                reason: e.to_string(),
            },
        )?;

        // Mirror first: the matrix appearing marks the build as complete.
        storage::write_mirror(&self.mirror_path, &mirror)?;
        let bytes = storage::write_matrix(&self.matrix_path, &matrix)?;

        info!(
            corpus = %self.corpus,
            rows = matrix.len(),
            dim = matrix.dim(),
            bytes,
            fingerprint = %short_hex(&fingerprint),
            path = %self.matrix_path.display(),
            "Embedding cache written"
        );
        Ok(matrix)
    }

    /// Deletes any persisted artifacts, then builds from scratch.
    pub async fn rebuild<P: EmbeddingProvider>(
        &self,
        records: &RecordStore,
        embedder: &BatchEmbedder<P>,
    ) -> CacheResult<EmbeddingMatrix> {
        self.invalidate()?;
        self.build(records, embedder).await
    }

    /// Deletes the matrix and mirror. Returns whether a matrix was present.
    pub fn invalidate(&self) -> CacheResult<bool> {
        let removed = storage::remove_if_exists(&self.matrix_path)?;
        storage::remove_if_exists(&self.mirror_path)?;
        if removed {
            info!(corpus = %self.corpus, "Embedding cache invalidated");
        }
        Ok(removed)
    }

    /// Looks up the mirrored vector for an already-prepared text.
    ///
    /// The mirror is informational; a missing mirror reads as no entry.
    pub fn lookup(&self, prepared_text: &str) -> CacheResult<Option<Vec<f32>>> {
        match storage::read_mirror(&self.mirror_path) {
            Ok(mut mirror) => Ok(mirror.remove(prepared_text)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn check_freshness(
        &self,
        matrix: &EmbeddingMatrix,
        record_count: usize,
        fingerprint: &[u8; 32],
        model: &str,
    ) {
        if matrix.model != model {
            warn!(
                corpus = %self.corpus,
                cached_model = %matrix.model,
                current_model = %model,
                "Embedding cache was built with a different model; queries may not be comparable"
            );
        }

        if matrix.len() != record_count {
            warn!(
                corpus = %self.corpus,
                cached_rows = matrix.len(),
                records = record_count,
                "Embedding cache row count differs from record count; only aligned rows are ranked"
            );
        } else if &matrix.fingerprint != fingerprint {
            warn!(
                corpus = %self.corpus,
                cached = %short_hex(&matrix.fingerprint),
                current = %short_hex(fingerprint),
                "Embedding cache was built from different texts; delete it to rebuild"
            );
        } else {
            debug!(corpus = %self.corpus, "Embedding cache matches records");
        }
    }
}

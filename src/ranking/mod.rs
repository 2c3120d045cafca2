//! Cosine-similarity ranking of candidate embeddings.


use tracing::debug;

use crate::constants::{DEFAULT_THRESHOLD, DEFAULT_TOP_N};

/// Score given to candidates that cannot be compared.
pub const DEGENERATE_SCORE: f32 = f32::NEG_INFINITY;

/// Cosine similarity of `a` and `b`, each normalized independently.
///
/// Returns [`DEGENERATE_SCORE`] for empty or zero-norm vectors, mismatched
/// lengths and non-finite components. Otherwise the result is clamped to
/// `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return DEGENERATE_SCORE;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !(dot.is_finite() && norm_a.is_finite() && norm_b.is_finite())
        || norm_a == 0.0
        || norm_b == 0.0
    {
        return DEGENERATE_SCORE;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    (score as f32).clamp(-1.0, 1.0)
}

/// Position of a candidate in the input sequence, with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedIndex {
    pub index: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankerConfig {
    /// Maximum number of results.
    pub top_n: usize,
    /// Minimum score to be returned (inclusive).
    pub threshold: f32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl RankerConfig {
    pub fn new(top_n: usize, threshold: f32) -> Self {
        Self { top_n, threshold }
    }
}

/// Selects the best-scoring candidates for a query.
#[derive(Debug, Clone, Default)]
pub struct SimilarityRanker {
    config: RankerConfig,
}

impl SimilarityRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RankerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Ranks with the configured `top_n` and threshold.
    pub fn rank<'a, I>(&self, query: &[f32], candidates: I) -> Vec<RankedIndex>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        rank_candidates(query, candidates, self.config.top_n, self.config.threshold)
    }
}

/// Scores every candidate against `query` and keeps the best `top_n` whose
/// score is at least `threshold`.
///
/// Output is sorted by descending score; equal scores keep their input order.
pub fn rank_candidates<'a, I>(
    query: &[f32],
    candidates: I,
    top_n: usize,
    threshold: f32,
) -> Vec<RankedIndex>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    if top_n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<RankedIndex> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| RankedIndex {
            index,
            score: cosine_similarity(query, candidate),
        })
        .filter(|r| r.score.is_finite() && r.score >= threshold)
        .collect();

    // Stable sort preserves input order among ties.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);

    debug!(
        top_n,
        threshold,
        matched = scored.len(),
        best = scored.first().map(|r| r.score),
        "Ranked candidates"
    );

    scored
}

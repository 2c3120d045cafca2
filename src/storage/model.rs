//! Storage model types.

use rkyv::{Archive, Deserialize, Serialize};

use crate::constants::{DimValidationError, validate_uniform_dim};

/// Row-major embedding matrix persisted per corpus.
///
/// Row `i` is the embedding of record `i`. Stored as `rkyv` bytes and read
/// through a memory map.
///
/// # Example
/// ```rust
/// use retrieval::storage::EmbeddingMatrix;
///
/// let matrix = EmbeddingMatrix::from_rows(
///     vec![vec![1.0, 0.0], vec![0.0, 1.0]],
///     [0u8; 32],
///     "text-embedding-3-small",
/// )
/// .unwrap();
/// assert_eq!(matrix.len(), 2);
/// assert_eq!(matrix.row(1), Some(&[0.0, 1.0][..]));
/// ```
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct EmbeddingMatrix {
    /// Number of rows (records).
    pub rows: u64,
    /// Columns per row (embedding dimension).
    pub dim: u64,
    /// BLAKE3 fingerprint of the designated texts this matrix was built from.
    pub fingerprint: [u8; 32],
    /// Embedding model identifier reported at build time.
    pub model: String,
    /// Row-major values, `rows * dim` long.
    pub values: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Packs uniform-width rows into a matrix.
    pub fn from_rows(
        rows: Vec<Vec<f32>>,
        fingerprint: [u8; 32],
        model: impl Into<String>,
    ) -> Result<Self, DimValidationError> {
        let dim = validate_uniform_dim(&rows)?;
        let row_count = rows.len();
        let values: Vec<f32> = rows.into_iter().flatten().collect();

        Ok(Self {
            rows: row_count as u64,
            dim: dim as u64,
            fingerprint,
            model: model.into(),
            values,
        })
    }

    /// Empty matrix (zero rows).
    pub fn empty(fingerprint: [u8; 32], model: impl Into<String>) -> Self {
        Self {
            rows: 0,
            dim: 0,
            fingerprint,
            model: model.into(),
            values: Vec::new(),
        }
    }

    /// Checks the shape is a homogeneous numeric 2D array.
    pub fn check_shape(&self) -> Result<(), String> {
        let expected = (self.rows as usize)
            .checked_mul(self.dim as usize)
            .ok_or_else(|| format!("shape {}x{} overflows", self.rows, self.dim))?;

        if self.values.len() != expected {
            return Err(format!(
                "shape {}x{} needs {} values, found {}",
                self.rows,
                self.dim,
                expected,
                self.values.len()
            ));
        }

        if self.rows > 0 && self.dim == 0 {
            return Err(format!("{} rows with zero dimension", self.rows));
        }

        if let Some(pos) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite value at flat index {}", pos));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dim(&self) -> usize {
        self.dim as usize
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len() {
            return None;
        }
        let dim = self.dim();
        self.values.get(index * dim..(index + 1) * dim)
    }

    /// Rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on zero; an empty matrix yields nothing either way.
        self.values.chunks_exact(self.dim().max(1))
    }
}

//! Dense per-segment embedding matrix
use super::EmbeddingError;
use ndarray::{Array1, Array2, ArrayView1};

/// One unit-normalized row per segment, tagged with the encoder that made it
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    model: String,
    vectors: Array2<f32>,
}

impl EmbeddingMatrix {
    /// Build a matrix from rows that must all have `dimension` finite values
    pub fn from_rows(
        model: impl Into<String>,
        dimension: usize,
        rows: Vec<Vec<f32>>,
    ) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "Embedding dimension must be greater than 0".to_string(),
            ));
        }

        let count = rows.len();
        let mut flat = Vec::with_capacity(count * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            if row.iter().any(|x| !x.is_finite()) {
                return Err(EmbeddingError::InvalidInput(
                    "Embedding contains non-finite values".to_string(),
                ));
            }
            flat.extend(row);
        }

        let vectors = Array2::from_shape_vec((count, dimension), flat)
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;

        Ok(Self {
            model: model.into(),
            vectors,
        })
    }

    /// Model identity of the encoder that produced these rows
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dot product of every row with `query`, in row order
    ///
    /// Callers must check `query.len() == self.dimension()` first.
    pub fn dot(&self, query: &[f32]) -> Array1<f32> {
        self.vectors.dot(&ArrayView1::from(query))
    }

    /// Rows as owned vectors, for serialization
    pub fn rows(&self) -> Vec<Vec<f32>> {
        self.vectors.outer_iter().map(|row| row.to_vec()).collect()
    }
}

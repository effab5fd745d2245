//! Vector-similarity scoring over the full corpus

use crate::embedding::EmbeddingMatrix;
use std::time::Duration;
use thiserror::Error;

/// Query vector together with the encoder that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEmbedding {
    pub model: String,
    pub vector: Vec<f32>,
}

/// Why a query runs in keyword-only mode
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticUnavailable {
    #[error("no encoder configured")]
    NoEncoder,

    #[error("corpus has no embeddings")]
    NoEmbeddings,

    #[error("query encoder '{query}' does not match corpus encoder '{corpus}'")]
    ModelMismatch { corpus: String, query: String },

    #[error("query dimension {query} does not match corpus dimension {corpus}")]
    DimensionMismatch { corpus: usize, query: usize },

    #[error("query vector contains non-finite values")]
    InvalidQueryVector,

    #[error("encoder failed: {0}")]
    EncoderFailed(String),

    #[error("encoder timed out after {0:?}")]
    EncoderTimedOut(Duration),
}

/// Map a cosine similarity in `[-1, 1]` onto `[0, 1]`
pub fn rescale_similarity(similarity: f32) -> f64 {
    ((f64::from(similarity) + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Score every corpus row against the query, one score per segment
///
/// Both sides are unit vectors, so cosine similarity is a plain dot product.
/// This is a full scan with no approximate index.
pub fn semantic_scores(
    embeddings: Option<&EmbeddingMatrix>,
    query: &QueryEmbedding,
) -> Result<Vec<f64>, SemanticUnavailable> {
    let embeddings = embeddings.ok_or(SemanticUnavailable::NoEmbeddings)?;

    if embeddings.model() != query.model {
        return Err(SemanticUnavailable::ModelMismatch {
            corpus: embeddings.model().to_string(),
            query: query.model.clone(),
        });
    }
    if embeddings.dimension() != query.vector.len() {
        return Err(SemanticUnavailable::DimensionMismatch {
            corpus: embeddings.dimension(),
            query: query.vector.len(),
        });
    }
    if query.vector.iter().any(|x| !x.is_finite()) {
        return Err(SemanticUnavailable::InvalidQueryVector);
    }

    Ok(embeddings
        .dot(&query.vector)
        .iter()
        .map(|&sim| rescale_similarity(sim))
        .collect())
}

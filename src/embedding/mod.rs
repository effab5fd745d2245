//! Embedding support
//!
//! The engine never loads a model itself: a host process supplies an
//! [`Encoder`] and the corpus carries precomputed vectors in a sidecar file.
//!
//! Architecture:
//! - Encoder trait for abstraction over embedding backends
//! - FastEmbedEncoder for local embedding (all-MiniLM-L6-v2, 384-dim)
//! - EmbeddingMatrix for full-scan dot-product similarity
//! - Sidecar file binding vectors to the corpus they were built from

mod batch;
mod matrix;
mod provider;
mod sidecar;

pub use batch::{build_embeddings, EmbeddingBuildReport};
pub use matrix::EmbeddingMatrix;
pub use provider::{EmbeddingError, Encoder, FastEmbedEncoder};
pub use sidecar::{corpus_fingerprint, load_embeddings, save_embeddings, EmbeddingsFile};

/// Scale a vector to unit length; zero vectors are returned unchanged
pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let v = normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}

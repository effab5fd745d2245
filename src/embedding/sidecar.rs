//! Embeddings sidecar file, bound to a corpus by fingerprint
use super::EmbeddingMatrix;
use crate::corpus::SegmentStore;
use crate::error::{MediaseekError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// On-disk embeddings: one row per loaded segment, in store order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsFile {
    /// Encoder model identity
    pub model: String,
    pub dimension: usize,
    /// BLAKE3 fingerprint of the corpus the rows were built from
    pub corpus_fingerprint: String,
    pub vectors: Vec<Vec<f32>>,
}

/// Fingerprint of the segment texts, in store order
pub fn corpus_fingerprint(store: &SegmentStore) -> String {
    let mut hasher = blake3::Hasher::new();
    for segment in store.segments() {
        hasher.update(segment.source_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(segment.text.as_bytes());
        hasher.update(&[0xff]);
    }
    hasher.finalize().to_hex().to_string()
}

/// Write the embeddings sidecar for `store`
pub fn save_embeddings(path: &Path, matrix: &EmbeddingMatrix, store: &SegmentStore) -> Result<()> {
    let file = EmbeddingsFile {
        model: matrix.model().to_string(),
        dimension: matrix.dimension(),
        corpus_fingerprint: corpus_fingerprint(store),
        vectors: matrix.rows(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            MediaseekError::io(e, format!("Failed to create embeddings directory: {:?}", parent))
        })?;
    }

    let bytes = serde_json::to_vec(&file)
        .map_err(|e| MediaseekError::json(e, "Failed to serialize embeddings"))?;
    std::fs::write(path, bytes).map_err(|e| {
        MediaseekError::io(e, format!("Failed to write embeddings: {}", path.display()))
    })?;

    info!(
        "Saved {} embeddings ({}D, {}) to {}",
        file.vectors.len(),
        file.dimension,
        file.model,
        path.display()
    );
    Ok(())
}

/// Load the embeddings sidecar for `store`
///
/// Returns `None`, with a warning, whenever the sidecar is absent or cannot be
/// trusted for this corpus. Semantic scoring is then unavailable; this is
/// never an error.
pub fn load_embeddings(path: &Path, store: &SegmentStore) -> Option<EmbeddingMatrix> {
    if !path.exists() {
        warn!(
            "No embeddings at {}, semantic scoring unavailable",
            path.display()
        );
        return None;
    }

    let file: EmbeddingsFile = match std::fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()))
    {
        Ok(file) => file,
        Err(e) => {
            warn!("Ignoring unreadable embeddings {}: {}", path.display(), e);
            return None;
        }
    };

    if file.vectors.len() != store.len() {
        warn!(
            "Ignoring embeddings {}: {} rows for {} segments",
            path.display(),
            file.vectors.len(),
            store.len()
        );
        return None;
    }

    let fingerprint = corpus_fingerprint(store);
    if file.corpus_fingerprint != fingerprint {
        warn!(
            "Ignoring stale embeddings {}: built for a different corpus",
            path.display()
        );
        return None;
    }

    match EmbeddingMatrix::from_rows(file.model, file.dimension, file.vectors) {
        Ok(matrix) => {
            info!(
                "Loaded {} embeddings ({}D, {})",
                matrix.len(),
                matrix.dimension(),
                matrix.model()
            );
            Some(matrix)
        }
        Err(e) => {
            warn!("Ignoring invalid embeddings {}: {}", path.display(), e);
            None
        }
    }
}

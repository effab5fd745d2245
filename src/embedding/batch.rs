//! Batch embedding of a whole corpus
use super::{normalize, EmbeddingError, EmbeddingMatrix, Encoder};
use crate::corpus::SegmentStore;
use tracing::{debug, info};

/// Result of a corpus embedding build
#[derive(Debug)]
pub struct EmbeddingBuildReport {
    pub segments: usize,
    pub batches: usize,
    pub duration_ms: u64,
}

/// Encode every segment of `store` in batches of `batch_size`
///
/// Rows come back in store order and are re-normalized to unit length, so a
/// slightly-off encoder cannot skew the dot-product similarity.
pub fn build_embeddings(
    encoder: &dyn Encoder,
    store: &SegmentStore,
    batch_size: usize,
) -> Result<(EmbeddingMatrix, EmbeddingBuildReport), EmbeddingError> {
    if batch_size == 0 {
        return Err(EmbeddingError::InvalidInput(
            "Batch size must be greater than 0".to_string(),
        ));
    }

    let start = std::time::Instant::now();
    let total = store.len();
    let dimension = encoder.dimension();

    info!(
        "Encoding {} segments with {} in batches of {}",
        total,
        encoder.model_name(),
        batch_size
    );

    let mut rows = Vec::with_capacity(total);
    let mut batches = 0;

    for chunk in store.segments().chunks(batch_size) {
        let texts: Vec<String> = chunk.iter().map(|s| s.text.clone()).collect();
        let embeddings = encoder.encode_batch(&texts)?;

        if embeddings.len() != chunk.len() {
            return Err(EmbeddingError::GenerationError(format!(
                "Embedding count mismatch: expected {}, got {}",
                chunk.len(),
                embeddings.len()
            )));
        }

        rows.extend(embeddings.into_iter().map(normalize));
        batches += 1;
        debug!("Encoded batch {} ({}/{})", batches, rows.len(), total);
    }

    let matrix = EmbeddingMatrix::from_rows(encoder.model_name(), dimension, rows)?;
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Embedding build complete: {} segments, {} batches, {}ms",
        total, batches, duration_ms
    );

    Ok((
        matrix,
        EmbeddingBuildReport {
            segments: total,
            batches,
            duration_ms,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Segment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Encodes text length into a 2D vector and counts batch calls
    struct LengthEncoder {
        calls: AtomicUsize,
    }

    impl Encoder for LengthEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            texts.iter().map(|t| self.encode(t)).collect()
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "length"
        }
    }

    #[test]
    fn test_batches_and_normalizes() {
        let store: SegmentStore = ["", "abc", "abcd", "a", "ab"]
            .iter()
            .enumerate()
            .map(|(i, t)| Segment::new("f", "f", i as f64, i as f64, *t))
            .collect();
        let encoder = LengthEncoder {
            calls: AtomicUsize::new(0),
        };

        let (matrix, report) = build_embeddings(&encoder, &store, 2).unwrap();

        assert_eq!(report.segments, 5);
        assert_eq!(report.batches, 3);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 3);
        assert_eq!(matrix.len(), 5);
        assert_eq!(matrix.model(), "length");

        // "" encodes to [0, 1], already unit length
        assert_eq!(matrix.rows()[0], vec![0.0, 1.0]);
        for row in matrix.rows() {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_batch_size() {
        let encoder = LengthEncoder {
            calls: AtomicUsize::new(0),
        };
        let result = build_embeddings(&encoder, &SegmentStore::default(), 0);
        assert!(result.is_err());
    }
}

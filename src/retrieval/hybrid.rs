//! Hybrid search combining keyword and semantic scoring

use crate::corpus::{normalize_query, Snapshot, SnapshotHandle};
use crate::embedding::Encoder;
use crate::retrieval::{
    keyword_score, merge_context, score_candidates, select_survivors, semantic_scores,
    QueryEmbedding, SearchHit, SemanticUnavailable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Hybrid searcher over the active corpus snapshot
pub struct SearchEngine {
    snapshots: Arc<SnapshotHandle>,
    encoder: Option<Arc<dyn Encoder>>,
    query_timeout: Duration,
    pending_encodes: Arc<AtomicUsize>,
}

/// Counts a query encode from spawn until its blocking closure is dropped
struct PendingEncode(Arc<AtomicUsize>);

impl PendingEncode {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for PendingEncode {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SearchEngine {
    /// Create a new search engine
    ///
    /// Without an encoder every query runs keyword-only.
    pub fn new(
        snapshots: Arc<SnapshotHandle>,
        encoder: Option<Arc<dyn Encoder>>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            snapshots,
            encoder,
            query_timeout,
            pending_encodes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Query encodes currently occupying a blocking thread
    ///
    /// Includes encodes whose query already timed out; they hold their
    /// thread until the encoder returns.
    pub fn pending_encodes(&self) -> usize {
        self.pending_encodes.load(Ordering::SeqCst)
    }

    /// Handle used to install reloaded snapshots
    pub fn snapshots(&self) -> &Arc<SnapshotHandle> {
        &self.snapshots
    }

    /// Perform hybrid search against the snapshot active when the call starts
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        let snapshot = self.snapshots.current();

        if normalize_query(query).is_empty() || snapshot.store().is_empty() {
            return Vec::new();
        }

        let query_embedding = if snapshot.embeddings().is_some() {
            match self.encode_query(query).await {
                Ok(embedding) => Some(embedding),
                Err(reason) => {
                    warn!("Semantic scoring unavailable, keyword-only: {}", reason);
                    None
                }
            }
        } else {
            debug!("Corpus has no embeddings, keyword-only");
            None
        };

        rank(&snapshot, query, query_embedding.as_ref())
    }

    /// Encode the query on a blocking thread, bounded by the query timeout
    async fn encode_query(&self, query: &str) -> Result<QueryEmbedding, SemanticUnavailable> {
        let encoder = self
            .encoder
            .clone()
            .ok_or(SemanticUnavailable::NoEncoder)?;
        let model = encoder.model_name().to_string();
        let text = query.to_string();

        // A timed-out encode keeps running on its blocking thread; its result is dropped
        let pending = PendingEncode::enter(&self.pending_encodes);
        let task = tokio::task::spawn_blocking(move || {
            let _pending = pending;
            encoder.encode(&text)
        });

        match tokio::time::timeout(self.query_timeout, task).await {
            Err(_) => {
                debug!(
                    "{} query encodes still running after timeout",
                    self.pending_encodes()
                );
                Err(SemanticUnavailable::EncoderTimedOut(self.query_timeout))
            }
            Ok(Err(join_error)) => Err(SemanticUnavailable::EncoderFailed(join_error.to_string())),
            Ok(Ok(Err(e))) => Err(SemanticUnavailable::EncoderFailed(e.to_string())),
            Ok(Ok(Ok(vector))) => Ok(QueryEmbedding { model, vector }),
        }
    }
}

/// Rank one query against a snapshot
///
/// Scores every segment, gates and sorts the candidates, walks them
/// best-first through windowed suppression until `top_k` survivors are found,
/// then expands each survivor with its context. Without a usable query
/// embedding every semantic score is `0.0`.
pub fn rank(
    snapshot: &Snapshot,
    query: &str,
    query_embedding: Option<&QueryEmbedding>,
) -> Vec<SearchHit> {
    let started = Instant::now();
    let normalized = normalize_query(query);
    let segments = snapshot.store().segments();

    if normalized.is_empty() || segments.is_empty() {
        return Vec::new();
    }

    let config = snapshot.ranking();

    let keyword: Vec<f64> = segments
        .iter()
        .map(|s| keyword_score(&s.normalized_text, &normalized))
        .collect();

    let semantic = match query_embedding {
        Some(embedding) => match semantic_scores(snapshot.embeddings(), embedding) {
            Ok(scores) => scores,
            Err(reason) => {
                warn!("Semantic scoring unavailable, keyword-only: {}", reason);
                vec![0.0; segments.len()]
            }
        },
        None => vec![0.0; segments.len()],
    };

    let candidates = score_candidates(segments, &keyword, &semantic, config);
    let gated = candidates.len();

    let survivors = select_survivors(candidates, config.window_seconds, config.top_k);

    let hits: Vec<SearchHit> = survivors
        .iter()
        .map(|candidate| {
            let context = merge_context(
                segments,
                candidate.index,
                config.context_before,
                config.context_after,
            );
            SearchHit::new(candidate, context)
        })
        .collect();

    debug!(
        "Ranked {} segments: {} passed the gate, {} returned in {:?}",
        segments.len(),
        gated,
        hits.len(),
        started.elapsed()
    );

    hits
}

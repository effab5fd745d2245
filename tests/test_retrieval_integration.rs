//! Integration tests: hybrid retrieval over in-memory corpora
//!
//! Uses table-driven encoders so semantic behavior is deterministic and no
//! model download is needed.

use mediaseek::config::RankingConfig;
use mediaseek::corpus::{Segment, SegmentStore, Snapshot, SnapshotHandle};
use mediaseek::embedding::{build_embeddings, EmbeddingError, Encoder};
use mediaseek::retrieval::{rank, QueryEmbedding, SearchEngine, SearchHit};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Encoder answering from a fixed text → vector table
struct TableEncoder {
    model: String,
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl TableEncoder {
    fn new(model: &str, entries: &[(&str, [f32; 2])]) -> Self {
        Self {
            model: model.to_string(),
            table: entries
                .iter()
                .map(|(text, v)| (text.to_lowercase(), v.to_vec()))
                .collect(),
            fallback: vec![0.0, 1.0],
        }
    }
}

impl Encoder for TableEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self
            .table
            .get(&text.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.encode(t)).collect()
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

struct SlowEncoder;

impl Encoder for SlowEncoder {
    fn encode(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(vec![1.0, 0.0])
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.encode(t)).collect()
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "flight-table"
    }
}

struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn encode(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::GenerationError("model crashed".to_string()))
    }

    fn encode_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::GenerationError("model crashed".to_string()))
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "flight-table"
    }
}

fn flight_encoder() -> TableEncoder {
    TableEncoder::new(
        "flight-table",
        &[
            ("emergency landing", [1.0, 0.0]),
            ("pre-flight checks", [-1.0, 0.0]),
            ("engine start", [-0.6, -0.8]),
            ("forced touchdown", [0.6, 0.8]),
        ],
    )
}

fn flight_store() -> SegmentStore {
    SegmentStore::new(vec![
        Segment::new("briefing/a.mp4", "a.mp4", 0.0, 6.0, "pre-flight checks"),
        Segment::new("briefing/a.mp4", "a.mp4", 10.0, 14.0, "engine start"),
        Segment::new("briefing/a.mp4", "a.mp4", 50.0, 57.5, "emergency landing"),
    ])
}

fn semantic_snapshot(store: SegmentStore, ranking: RankingConfig) -> Snapshot {
    let (matrix, _) = build_embeddings(&flight_encoder(), &store, 2).unwrap();
    Snapshot::new(store, Some(matrix), ranking)
}

fn engine_with(snapshot: Snapshot, encoder: Option<Arc<dyn Encoder>>) -> SearchEngine {
    SearchEngine::new(
        Arc::new(SnapshotHandle::new(snapshot)),
        encoder,
        Duration::from_millis(2000),
    )
}

fn assert_single_landing_hit(hits: &[SearchHit]) {
    assert_eq!(hits.len(), 1, "hits: {hits:?}");
    let hit = &hits[0];
    assert_eq!(hit.hit_start, 50.0);
    assert_eq!(hit.scores.keyword, 1.0);
    assert!(hit.start <= 50.0 && hit.end >= 57.5);
    assert!(hit.snippet.contains("emergency landing"));
    assert_eq!(hit.source_label, "a.mp4");
    assert_eq!(hit.source_id, "briefing/a.mp4");
}

#[tokio::test]
async fn test_exact_phrase_keyword_only() {
    let snapshot = Snapshot::new(flight_store(), None, RankingConfig::default());
    let engine = engine_with(snapshot, None);

    let hits = engine.search("emergency landing").await;

    assert_single_landing_hit(&hits);
    assert_eq!(hits[0].scores.semantic, 0.0);
    // Context merge pulls in the preceding same-file segment
    assert_eq!(hits[0].start, 10.0);
    assert_eq!(hits[0].snippet, "engine start … emergency landing");
}

#[tokio::test]
async fn test_exact_phrase_with_semantic() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let engine = engine_with(snapshot, Some(Arc::new(flight_encoder())));

    let hits = engine.search("Emergency Landing").await;

    assert_single_landing_hit(&hits);
    assert_eq!(hits[0].scores.semantic, 1.0);
    assert_eq!(hits[0].scores.total, 0.65 + 0.35);
}

#[tokio::test]
async fn test_semantic_only_match() {
    let store = SegmentStore::new(vec![
        Segment::new("a.mp4", "a.mp4", 0.0, 5.0, "engine start"),
        Segment::new("b.mp4", "b.mp4", 30.0, 35.0, "forced touchdown"),
    ]);
    let snapshot = semantic_snapshot(store, RankingConfig::default());
    let engine = engine_with(snapshot, Some(Arc::new(flight_encoder())));

    let hits = engine.search("emergency landing").await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source_id, "b.mp4");
    assert_eq!(hits[0].scores.keyword, 0.0);
    assert!((hits[0].scores.semantic - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_encoder_timeout_degrades_to_keyword_only() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let engine = SearchEngine::new(
        Arc::new(SnapshotHandle::new(snapshot)),
        Some(Arc::new(SlowEncoder)),
        Duration::from_millis(50),
    );

    let hits = engine.search("emergency landing").await;

    assert_single_landing_hit(&hits);
    assert_eq!(hits[0].scores.semantic, 0.0);
}

#[tokio::test]
async fn test_timed_out_encodes_are_counted_until_they_finish() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let engine = SearchEngine::new(
        Arc::new(SnapshotHandle::new(snapshot)),
        Some(Arc::new(SlowEncoder)),
        Duration::from_millis(50),
    );
    assert_eq!(engine.pending_encodes(), 0);

    engine.search("emergency landing").await;
    engine.search("engine").await;

    // Both encodes outlived their query and still hold a blocking thread
    assert_eq!(engine.pending_encodes(), 2);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(engine.pending_encodes(), 0);
}

#[tokio::test]
async fn test_encoder_failure_degrades_to_keyword_only() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let engine = engine_with(snapshot, Some(Arc::new(FailingEncoder)));

    let hits = engine.search("engine").await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].hit_start, 10.0);
    assert_eq!(hits[0].scores.semantic, 0.0);
}

#[tokio::test]
async fn test_model_identity_mismatch_degrades() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let mut other = flight_encoder();
    other.model = "flight-table-v2".to_string();
    let engine = engine_with(snapshot, Some(Arc::new(other)));

    let hits = engine.search("emergency landing").await;

    assert_single_landing_hit(&hits);
    assert_eq!(hits[0].scores.semantic, 0.0);
}

#[tokio::test]
async fn test_no_keyword_hit_and_no_semantic_returns_nothing() {
    let snapshot = Snapshot::new(flight_store(), None, RankingConfig::default());
    let engine = engine_with(snapshot, None);

    assert!(engine.search("cabin pressure").await.is_empty());
}

#[test]
fn test_top_k_two_of_five_distinct_files() {
    let sims = [0.8f32, 0.6, 0.4, 0.2, 0.0];
    let segments: Vec<Segment> = (0..5)
        .map(|i| {
            let file = format!("file{i}.mp4");
            Segment::new(file.clone(), file, 0.0, 4.0, format!("segment {i}"))
        })
        .collect();
    let rows: Vec<Vec<f32>> = sims.iter().map(|&x| vec![x, (1.0 - x * x).sqrt()]).collect();
    let matrix = mediaseek::embedding::EmbeddingMatrix::from_rows("toy", 2, rows).unwrap();
    let query = QueryEmbedding {
        model: "toy".to_string(),
        vector: vec![1.0, 0.0],
    };

    for window in [0.0, 20.0, 1_000_000.0] {
        let ranking = RankingConfig {
            top_k: 2,
            window_seconds: window,
            ..RankingConfig::default()
        };
        let snapshot = Snapshot::new(
            SegmentStore::new(segments.clone()),
            Some(matrix.clone()),
            ranking,
        );

        let hits = rank(&snapshot, "unmatched words", Some(&query));

        let files: Vec<&str> = hits.iter().map(|h| h.source_id.as_str()).collect();
        assert_eq!(files, vec!["file0.mp4", "file1.mp4"]);
        assert!(hits[0].scores.total > hits[1].scores.total);
    }
}

#[test]
fn test_same_file_hits_are_windowed() {
    // Every segment mentions the keyword; within one 20s window only the
    // best (earliest position → highest keyword score) survives
    let segments = vec![
        Segment::new("a.mp4", "a.mp4", 0.0, 4.0, "later we check the mayday call"),
        Segment::new("a.mp4", "a.mp4", 5.0, 9.0, "mayday mayday"),
        Segment::new("a.mp4", "a.mp4", 12.0, 16.0, "a mayday"),
        Segment::new("a.mp4", "a.mp4", 60.0, 64.0, "mayday again"),
        Segment::new("b.mp4", "b.mp4", 5.0, 9.0, "mayday from b"),
    ];
    let ranking = RankingConfig {
        context_before: 0,
        context_after: 0,
        ..RankingConfig::default()
    };
    let snapshot = Snapshot::new(SegmentStore::new(segments), None, ranking);

    let hits = rank(&snapshot, "mayday", None);

    let picked: Vec<(&str, f64)> = hits
        .iter()
        .map(|h| (h.source_id.as_str(), h.hit_start))
        .collect();
    assert_eq!(picked, vec![("a.mp4", 5.0), ("a.mp4", 60.0), ("b.mp4", 5.0)]);

    for (i, a) in hits.iter().enumerate() {
        for b in &hits[i + 1..] {
            if a.source_id == b.source_id {
                assert!((a.hit_start - b.hit_start).abs() > 20.0);
            }
        }
    }
}

#[tokio::test]
async fn test_repeated_queries_are_identical() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let engine = engine_with(snapshot, Some(Arc::new(flight_encoder())));

    let first = engine.search("emergency landing").await;
    let second = engine.search("emergency landing").await;

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_concurrent_queries_match_sequential() {
    let snapshot = semantic_snapshot(flight_store(), RankingConfig::default());
    let engine = Arc::new(engine_with(snapshot, Some(Arc::new(flight_encoder()))));

    let expected_landing = engine.search("emergency landing").await;
    let expected_engine = engine.search("engine").await;

    let (landing, engine_hits, landing_again) = tokio::join!(
        engine.search("emergency landing"),
        engine.search("engine"),
        engine.search("emergency landing"),
    );

    assert_eq!(landing, expected_landing);
    assert_eq!(landing_again, expected_landing);
    assert_eq!(engine_hits, expected_engine);
}

#[tokio::test]
async fn test_reload_swaps_whole_snapshot() {
    let old = Snapshot::new(flight_store(), None, RankingConfig::default());
    let engine = engine_with(old, None);

    let captured = engine.snapshots().current();

    let reloaded_store = SegmentStore::new(vec![Segment::new(
        "debrief/b.mp4",
        "b.mp4",
        3.0,
        8.0,
        "emergency landing was smooth",
    )]);
    let ranking = RankingConfig {
        top_k: 1,
        ..RankingConfig::default()
    };
    engine
        .snapshots()
        .replace(Snapshot::new(reloaded_store, None, ranking));

    // A query holding the old snapshot sees only old data
    let old_hits = rank(&captured, "emergency landing", None);
    assert_single_landing_hit(&old_hits);

    // New queries see only the new snapshot
    let new_hits = engine.search("emergency landing").await;
    assert_eq!(new_hits.len(), 1);
    assert_eq!(new_hits[0].source_id, "debrief/b.mp4");
    assert_eq!(new_hits[0].snippet, "emergency landing was smooth");
}

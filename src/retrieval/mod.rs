//! Ranking & retrieval
//!
//! Keyword and semantic scores are blended and gated per segment, sorted,
//! then walked best-first through per-file windowed suppression until the
//! top-K budget is spent. Each survivor is expanded with its neighbors.

mod context;
mod deduplication;
mod hit;
mod hybrid;
mod keyword;
mod scoring;
mod semantic;

pub use context::{merge_context, ContextRun, CONTEXT_SEPARATOR};
pub use deduplication::select_survivors;
pub use hit::{HitScores, SearchHit};
pub use hybrid::{rank, SearchEngine};
pub use keyword::{keyword_score, KEYWORD_HIT_FLOOR};
pub use scoring::{early_bonus, passes_gate, score_candidates, total_score, ScoredCandidate};
pub use semantic::{rescale_similarity, semantic_scores, QueryEmbedding, SemanticUnavailable};

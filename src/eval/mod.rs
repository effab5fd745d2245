//! Retrieval quality evaluation (precision@K over labelled queries)

use crate::error::{MediaseekError, Result};
use crate::retrieval::{SearchEngine, SearchHit};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A labelled query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    #[serde(rename = "q")]
    pub query: String,
    /// Expected hits as `label#start-end`; only the label part is compared
    #[serde(default)]
    pub expect: Vec<String>,
}

/// Outcome of one labelled query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub query: String,
    pub found: bool,
    pub returned: usize,
}

/// Aggregate evaluation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub outcomes: Vec<QueryOutcome>,
    pub hits: usize,
    pub total: usize,
}

impl EvalReport {
    /// Fraction of queries with an expected result in the top K
    pub fn precision(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64
        }
    }
}

/// Load labelled queries from a JSON array
pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let bytes = std::fs::read(path).map_err(|e| {
        MediaseekError::io(e, format!("Failed to read eval queries: {}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        MediaseekError::json(e, format!("Invalid eval queries: {}", path.display()))
    })
}

/// Key identifying a hit: `label#start-end` with whole seconds
pub fn result_key(hit: &SearchHit) -> String {
    format!(
        "{}#{}-{}",
        hit.source_label,
        hit.hit_start.floor() as i64,
        hit.hit_end.floor() as i64
    )
}

/// Whether any hit matches any expectation
pub fn matches_expectation(hits: &[SearchHit], expect: &[String]) -> bool {
    hits.iter().any(|hit| {
        let key = result_key(hit);
        expect.iter().any(|e| {
            let file = e.split('#').next().unwrap_or(e);
            key.starts_with(file)
        })
    })
}

/// Run every case through the engine
///
/// Each query goes through the full [`SearchEngine::search`] path, windowed
/// same-file suppression included, so the top K scored here is the top K a
/// user sees. A plain cut of the gated candidates would let near-duplicate
/// segments of one file crowd out other files, so precision from this
/// function is not comparable with a cut taken before suppression.
pub async fn evaluate(engine: &SearchEngine, cases: &[EvalCase]) -> EvalReport {
    let mut outcomes = Vec::with_capacity(cases.len());

    for case in cases {
        let hits = engine.search(&case.query).await;
        let found = matches_expectation(&hits, &case.expect);
        debug!(
            "Q: {:20} -> {}  ({} returned)",
            case.query,
            if found { "OK" } else { "MISS" },
            hits.len()
        );
        outcomes.push(QueryOutcome {
            query: case.query.clone(),
            found,
            returned: hits.len(),
        });
    }

    let hits = outcomes.iter().filter(|o| o.found).count();
    EvalReport {
        total: outcomes.len(),
        hits,
        outcomes,
    }
}

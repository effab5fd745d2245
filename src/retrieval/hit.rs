//! Search hit structures

use super::{ContextRun, ScoredCandidate};
use serde::{Deserialize, Serialize};

/// Per-signal scores behind a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitScores {
    /// Keyword score (0.0 means no literal hit)
    pub keyword: f64,
    /// Semantic score (0.0 when semantic scoring was unavailable)
    pub semantic: f64,
    /// Blended score used for ranking
    pub total: f64,
}

/// One ranked result, expanded with its context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identifier of the source media file
    pub source_id: String,

    /// Display name of the source media file
    pub source_label: String,

    /// Start of the merged context run, in seconds
    pub start: f64,

    /// End of the merged context run, in seconds
    pub end: f64,

    /// Context run text in time order
    pub snippet: String,

    /// Store index of the matching segment
    pub segment_index: usize,

    /// Start of the matching segment itself
    pub hit_start: f64,

    /// End of the matching segment itself
    pub hit_end: f64,

    pub scores: HitScores,
}

impl SearchHit {
    pub fn new(candidate: &ScoredCandidate<'_>, context: ContextRun) -> Self {
        let segment = candidate.segment;
        Self {
            source_id: segment.source_id.clone(),
            source_label: segment.source_label.clone(),
            start: context.start,
            end: context.end,
            snippet: context.text,
            segment_index: candidate.index,
            hit_start: segment.start,
            hit_end: segment.end,
            scores: HitScores {
                keyword: candidate.keyword,
                semantic: candidate.semantic,
                total: candidate.total,
            },
        }
    }

    /// Get a short preview of the snippet (first N characters)
    pub fn preview(&self, max_chars: usize) -> String {
        if self.snippet.chars().count() <= max_chars {
            self.snippet.clone()
        } else {
            let cut: String = self.snippet.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}

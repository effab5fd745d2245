//! Score combination, inclusion gate and candidate ordering

use crate::config::RankingConfig;
use crate::corpus::Segment;

/// A segment with its per-query scores
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    /// Position of the segment in the store
    pub index: usize,
    pub segment: &'a Segment,
    pub keyword: f64,
    pub semantic: f64,
    pub total: f64,
}

/// Bonus for segments starting at or before the early-time threshold
pub fn early_bonus(start: f64, config: &RankingConfig) -> f64 {
    if start <= config.early_time_bonus_threshold_seconds {
        config.early_time_bonus_amount
    } else {
        0.0
    }
}

/// Weighted blend of both signals plus the positional bonus
pub fn total_score(keyword: f64, semantic: f64, start: f64, config: &RankingConfig) -> f64 {
    config.semantic_weight * semantic + config.keyword_weight * keyword + early_bonus(start, config)
}

/// Inclusion gate
///
/// A literal keyword hit always passes. Without one, the candidate must clear
/// both the semantic floor and the total-score floor.
pub fn passes_gate(keyword: f64, semantic: f64, total: f64, config: &RankingConfig) -> bool {
    if keyword == 0.0 && semantic < config.min_semantic {
        return false;
    }
    if total < config.min_total && keyword == 0.0 {
        return false;
    }
    true
}

/// Score, gate and order every segment
///
/// `keyword` and `semantic` hold one score per segment. The result is sorted
/// by total descending; the sort is stable, so equal totals keep store order.
pub fn score_candidates<'a>(
    segments: &'a [Segment],
    keyword: &[f64],
    semantic: &[f64],
    config: &RankingConfig,
) -> Vec<ScoredCandidate<'a>> {
    let mut candidates: Vec<ScoredCandidate<'a>> = segments
        .iter()
        .zip(keyword.iter().zip(semantic))
        .enumerate()
        .filter_map(|(index, (segment, (&kw, &sem)))| {
            let total = total_score(kw, sem, segment.start, config);
            passes_gate(kw, sem, total, config).then_some(ScoredCandidate {
                index,
                segment,
                keyword: kw,
                semantic: sem,
                total,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.total.total_cmp(&a.total));
    candidates
}

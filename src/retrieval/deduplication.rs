//! Windowed per-file suppression interleaved with top-K selection

use crate::retrieval::ScoredCandidate;
use ahash::AHashMap;

/// Walk candidates best-first, keeping at most one hit per time window per file
///
/// `candidates` must already be sorted by total descending. For each
/// candidate, the accepted `(start, total)` pairs of its file are scanned for
/// the first one within `window_seconds`:
/// - none found: the candidate is accepted;
/// - found with a score greater than or equal to the candidate's: rejected;
/// - found with a lower score: that pair is replaced by the candidate's and
///   the candidate is accepted. The earlier hit stays in the output.
///
/// Only the first overlapping pair is consulted, so two survivors of one file
/// may sit within `2 * window_seconds` of each other when a suppressed
/// candidate bridged them.
///
/// The walk stops as soon as `top_k` survivors are accepted; later
/// candidates are never examined.
pub fn select_survivors<'a, I>(
    candidates: I,
    window_seconds: f64,
    top_k: usize,
) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator<Item = ScoredCandidate<'a>>,
{
    let mut kept = Vec::new();
    if top_k == 0 {
        return kept;
    }

    let mut accepted_by_file: AHashMap<&'a str, Vec<(f64, f64)>> = AHashMap::new();

    for candidate in candidates {
        let start = candidate.segment.start;
        let accepted = accepted_by_file
            .entry(candidate.segment.source_id.as_str())
            .or_default();

        let overlap = accepted
            .iter()
            .position(|&(prev_start, _)| (start - prev_start).abs() <= window_seconds);

        let keep = match overlap {
            None => true,
            Some(pos) if candidate.total <= accepted[pos].1 => false,
            Some(pos) => {
                accepted.remove(pos);
                true
            }
        };

        if keep {
            accepted.push((start, candidate.total));
            kept.push(candidate);
            if kept.len() >= top_k {
                break;
            }
        }
    }

    kept
}

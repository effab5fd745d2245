//! Expansion of a hit into its same-file temporal neighbors

use crate::corpus::Segment;

/// Separator placed between neighboring segment texts in a merged snippet
pub const CONTEXT_SEPARATOR: &str = " … ";

/// A hit stitched together with its neighbors
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRun {
    /// Store indices of the run, ordered by start time
    pub indices: Vec<usize>,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Merge up to `before` preceding and `after` following segments around `hit`
///
/// Neighbors are taken by store index. Those outside the store or belonging
/// to a different source than the hit are dropped, never replaced.
pub fn merge_context(segments: &[Segment], hit: usize, before: usize, after: usize) -> ContextRun {
    let Some(anchor) = segments.get(hit) else {
        return ContextRun {
            indices: Vec::new(),
            start: 0.0,
            end: 0.0,
            text: String::new(),
        };
    };

    let first = hit.saturating_sub(before);
    let last = hit.saturating_add(after).min(segments.len() - 1);

    let mut indices: Vec<usize> = (first..=last)
        .filter(|&i| segments[i].source_id == anchor.source_id)
        .collect();
    indices.sort_by(|&a, &b| segments[a].start.total_cmp(&segments[b].start));

    let start = indices
        .iter()
        .map(|&i| segments[i].start)
        .fold(f64::INFINITY, f64::min);
    let end = indices
        .iter()
        .map(|&i| segments[i].end)
        .fold(f64::NEG_INFINITY, f64::max);
    let text = indices
        .iter()
        .map(|&i| segments[i].text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    ContextRun {
        indices,
        start,
        end,
        text,
    }
}

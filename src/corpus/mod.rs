//! Segment corpus: loading, building and immutable snapshots
//!
//! The corpus is an ordered collection of [`Segment`]s grouped implicitly by
//! source file. It is loaded once, wrapped in a [`Snapshot`] together with its
//! embeddings and ranking configuration, and shared read-only by every query.

mod builder;
mod loader;
mod segment;
mod snapshot;

pub use builder::{build_index, BuildReport};
pub use loader::{load_index, LoadDiagnostic, LoadedCorpus};
pub use segment::{normalize_query, normalize_text, Segment};
pub use snapshot::{Snapshot, SnapshotHandle};

/// Ordered, immutable collection of segments
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromIterator<Segment> for SegmentStore {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

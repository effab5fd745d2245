//! Search index loading with per-document validation

use super::{Segment, SegmentStore};
use crate::error::{MediaseekError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// On-disk index file: `{"docs": [...]}`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IndexFile<D> {
    #[serde(default = "Vec::new")]
    pub docs: Vec<D>,
}

/// One document of the on-disk index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IndexDoc {
    pub media_file: String,
    pub media_relpath: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Written for compatibility with other readers; recomputed on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_norm: Option<String>,
}

/// Record of a document excluded at load time
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDiagnostic {
    /// Position of the document in the raw `docs` array
    pub ordinal: usize,
    pub reason: String,
}

/// Result of loading an index: the valid segments plus what was dropped
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub store: SegmentStore,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Load the search index at `path`
///
/// A missing file yields an empty corpus. Malformed documents are excluded
/// and reported in [`LoadedCorpus::diagnostics`]; only an unreadable or
/// structurally invalid file is an error.
pub fn load_index(path: &Path) -> Result<LoadedCorpus> {
    if !path.exists() {
        warn!(
            "Search index not found at {}, serving an empty corpus",
            path.display()
        );
        return Ok(LoadedCorpus::default());
    }

    let bytes = std::fs::read(path).map_err(|e| {
        MediaseekError::io(e, format!("Failed to read search index: {}", path.display()))
    })?;
    let file: IndexFile<serde_json::Value> = serde_json::from_slice(&bytes).map_err(|e| {
        MediaseekError::json(e, format!("Invalid search index: {}", path.display()))
    })?;

    let loaded = segments_from_docs(file.docs);

    info!(
        "Loaded {} segments from {} ({} dropped)",
        loaded.store.len(),
        path.display(),
        loaded.diagnostics.len()
    );

    Ok(loaded)
}

pub(crate) fn segments_from_docs(docs: Vec<serde_json::Value>) -> LoadedCorpus {
    let mut segments = Vec::with_capacity(docs.len());
    let mut diagnostics = Vec::new();

    for (ordinal, value) in docs.into_iter().enumerate() {
        match decode_doc(value) {
            Ok(segment) => segments.push(segment),
            Err(reason) => {
                warn!("Dropping malformed segment #{}: {}", ordinal, reason);
                diagnostics.push(LoadDiagnostic { ordinal, reason });
            }
        }
    }

    LoadedCorpus {
        store: SegmentStore::new(segments),
        diagnostics,
    }
}

fn decode_doc(value: serde_json::Value) -> std::result::Result<Segment, String> {
    let doc: IndexDoc = serde_json::from_value(value).map_err(|e| e.to_string())?;

    if !doc.start.is_finite() || !doc.end.is_finite() {
        return Err(format!(
            "non-finite time range {}..{}",
            doc.start, doc.end
        ));
    }
    if doc.start < 0.0 {
        return Err(format!("negative start time {}", doc.start));
    }
    if doc.end < doc.start {
        return Err(format!("end {} is before start {}", doc.end, doc.start));
    }

    Ok(Segment::new(
        doc.media_relpath,
        doc.media_file,
        doc.start,
        doc.end,
        doc.text,
    ))
}

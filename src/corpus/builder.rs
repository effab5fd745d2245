//! Search index construction from transcript files

use super::loader::{IndexDoc, IndexFile};
use super::normalize_text;
use crate::error::{MediaseekError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Transcript file as written by the speech-to-text step
#[derive(Debug, Deserialize)]
struct Transcript {
    media_file: String,
    media_relpath: String,
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
}

#[derive(Debug, Deserialize)]
struct TranscriptSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

/// Summary of an index build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Transcript files that contributed segments
    pub transcripts: usize,
    /// Transcript files skipped because they could not be read or parsed
    pub skipped: usize,
    /// Segments written to the index
    pub segments: usize,
}

/// Build the search index from every `*.json` transcript in `transcripts_dir`
///
/// Files are processed in name order so rebuilding an unchanged directory
/// produces an identical index.
pub fn build_index(transcripts_dir: &Path, output: &Path) -> Result<BuildReport> {
    let mut report = BuildReport::default();
    let mut docs = Vec::new();

    for path in transcript_files(transcripts_dir)? {
        match read_transcript(&path) {
            Ok(transcript) => {
                report.transcripts += 1;
                docs.extend(transcript.segments.into_iter().map(|seg| IndexDoc {
                    media_file: transcript.media_file.clone(),
                    media_relpath: transcript.media_relpath.replace('\\', "/"),
                    start: seg.start,
                    end: seg.end,
                    text_norm: Some(normalize_text(&seg.text)),
                    text: seg.text,
                }));
            }
            Err(reason) => {
                warn!("Skipping transcript {}: {}", path.display(), reason);
                report.skipped += 1;
            }
        }
    }

    report.segments = docs.len();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            MediaseekError::io(e, format!("Failed to create index directory: {:?}", parent))
        })?;
    }

    let bytes = serde_json::to_vec(&IndexFile { docs })
        .map_err(|e| MediaseekError::json(e, "Failed to serialize search index"))?;
    std::fs::write(output, bytes).map_err(|e| {
        MediaseekError::io(e, format!("Failed to write search index: {}", output.display()))
    })?;

    info!(
        "Built index {} ({} segments from {} transcripts, {} skipped)",
        output.display(),
        report.segments,
        report.transcripts,
        report.skipped
    );

    Ok(report)
}

fn transcript_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MediaseekError::Corpus(format!(
            "Transcripts directory not found: {}",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| {
        MediaseekError::io(e, format!("Failed to read transcripts directory: {}", dir.display()))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn read_transcript(path: &Path) -> std::result::Result<Transcript, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

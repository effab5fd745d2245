//! Segment model and text normalization

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One retrievable span of transcribed speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Identifier of the originating media file
    pub source_id: String,
    /// Display name of the originating media file
    pub source_label: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds, never before `start`
    pub end: f64,
    /// Raw display text
    pub text: String,
    /// Lowercased, whitespace-collapsed `text`, used for keyword matching
    pub normalized_text: String,
}

impl Segment {
    /// Create a segment, deriving its normalized text
    pub fn new(
        source_id: impl Into<String>,
        source_label: impl Into<String>,
        start: f64,
        end: f64,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let normalized_text = normalize_text(&text);
        Self {
            source_id: source_id.into(),
            source_label: source_label.into(),
            start,
            end,
            text,
            normalized_text,
        }
    }
}

fn whitespace() -> Option<&'static Regex> {
    static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").ok()).as_ref()
}

/// Lowercase, collapse whitespace runs to a single space, and trim
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    match whitespace() {
        Some(re) => re.replace_all(&lowered, " ").trim().to_string(),
        // Same result as the pattern: both split on Unicode White_Space
        None => lowered.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Normalize a query for keyword matching: lowercase and trim only
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

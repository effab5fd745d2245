//! Literal substring keyword scoring

/// Minimum score granted to any literal hit, however late in the text
pub const KEYWORD_HIT_FLOOR: f64 = 0.6;

/// Score a normalized query against a segment's normalized text
///
/// Returns exactly `0.0` when the query does not occur in the text; callers
/// rely on that value to mean "no keyword hit". Otherwise the score is
/// `max(0.6, 1 / (1 + pos))` where `pos` is the character offset of the first
/// occurrence.
pub fn keyword_score(normalized_text: &str, normalized_query: &str) -> f64 {
    if normalized_query.is_empty() {
        return 0.0;
    }

    match normalized_text.find(normalized_query) {
        Some(byte_pos) => {
            let pos = normalized_text[..byte_pos].chars().count();
            KEYWORD_HIT_FLOOR.max(1.0 / (1.0 + pos as f64))
        }
        None => 0.0,
    }
}

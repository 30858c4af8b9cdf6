//! Reference-sequence parsing from study-card fields.
//!
//! A field is either a JSON array of SAN tokens (nested one level deep is
//! flattened) or plain PGN movetext.

use regex::Regex;
use serde_json::Value as JsonValue;

/// Parse a card's move field into an ordered list of notation tokens.
/// Unparsable JSON yields an empty sequence.
pub fn parse_sequence_field(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') && !starts_with_pgn_header(trimmed) {
        return parse_json_sequence(trimmed);
    }
    extract_moves(trimmed).unwrap_or_default()
}

/// `[Event "..."]` rather than `["e4", ...]`.
fn starts_with_pgn_header(raw: &str) -> bool {
    raw[1..]
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
}

fn parse_json_sequence(raw: &str) -> Vec<String> {
    let parsed: JsonValue = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Move field is not valid JSON: {e}");
            return Vec::new();
        }
    };

    let Some(items) = parsed.as_array() else {
        return Vec::new();
    };

    let mut tokens = Vec::new();
    for item in items {
        match item {
            JsonValue::Array(inner) => tokens.extend(inner.iter().filter_map(token_of)),
            other => tokens.extend(token_of(other)),
        }
    }
    tokens
}

fn token_of(value: &JsonValue) -> Option<String> {
    let token = value.as_str()?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
pub fn extract_moves(pgn: &str) -> Option<Vec<String>> {
    // Remove headers
    let header_re = Regex::new(r"\[[^\]]*\]").ok()?;
    let no_headers = header_re.replace_all(pgn, "");

    // Remove comments
    let comment_re = Regex::new(r"\{[^}]*\}").ok()?;
    let no_comments = comment_re.replace_all(&no_headers, "");

    // Remove variations
    let variation_re = Regex::new(r"\([^)]*\)").ok()?;
    let no_variations = variation_re.replace_all(&no_comments, "");

    let move_re = Regex::new(
        r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBNqrbn])?[+#]?|O-O-O[+#]?|O-O[+#]?",
    )
    .ok()?;

    Some(
        move_re
            .find_iter(&no_variations)
            .map(|m| m.as_str().to_string())
            .collect(),
    )
}

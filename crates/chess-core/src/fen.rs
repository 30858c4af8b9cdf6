//! Position-string helpers. Positions are opaque to the trainer; these only
//! deal with the "start" sentinel and FEN normalization.

/// Sentinel accepted wherever a position string is expected.
pub const START_SENTINEL: &str = "start";

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// True for the start sentinel (any case, surrounding whitespace ignored).
pub fn is_start_sentinel(position: &str) -> bool {
    position.trim().eq_ignore_ascii_case(START_SENTINEL)
}

/// Trim a raw card field; blank input becomes the start sentinel.
pub fn normalize_position_input(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        START_SENTINEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

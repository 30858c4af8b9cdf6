//! Move notation helpers on top of shakmaty.
//!
//! Squares are exchanged as two-char tokens (`e2`). Castling is addressed by
//! the king's destination square, the way board widgets report drags.

use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, File, Move, Position, Rank, Role, Square};

/// Parse a two-char coordinate token (file a-h, rank 1-8).
pub fn parse_square(token: &str) -> Option<Square> {
    let bytes = token.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(Square::from_coords(
        File::new(u32::from(file - b'a')),
        Rank::new(u32::from(rank - b'1')),
    ))
}

/// Zero-based (file, rank) of a valid coordinate token.
pub fn square_coords(token: &str) -> Option<(u32, u32)> {
    parse_square(token).map(|sq| (sq.file() as u32, sq.rank() as u32))
}

/// Where the king lands when castling with the given rook.
pub fn king_destination(king: Square, rook: Square) -> Square {
    let to_file = if rook.file() > king.file() { 6u32 } else { 2u32 };
    Square::from_coords(File::new(to_file), king.rank())
}

/// Origin and destination squares of a move, castling by king destination.
pub fn move_squares(mv: &Move) -> Option<(Square, Square)> {
    match mv {
        Move::Normal { from, to, .. } => Some((*from, *to)),
        Move::EnPassant { from, to } => Some((*from, *to)),
        Move::Castle { king, rook } => Some((*king, king_destination(*king, *rook))),
        _ => None,
    }
}

/// Promotion piece letter, lowercase.
pub fn promotion_char(mv: &Move) -> Option<char> {
    mv.promotion().map(|role| role.char())
}

/// Find the legal move going from `origin` to `destination`.
///
/// An explicit promotion letter must match; without one, only the queen
/// promotion is accepted.
pub fn find_coordinate_move(
    pos: &Chess,
    origin: Square,
    destination: Square,
    promotion: Option<char>,
) -> Option<Move> {
    let wanted = match promotion {
        Some(c) => Some(Role::from_char(c.to_ascii_lowercase())?),
        None => None,
    };

    pos.legal_moves()
        .iter()
        .find(|m| {
            let squares_match = match move_squares(m) {
                Some((from, to)) => from == origin && to == destination,
                None => false,
            };
            if !squares_match {
                return false;
            }
            match (m.promotion(), wanted) {
                (None, None) => true,
                (Some(role), Some(w)) => role == w,
                (Some(role), None) => role == Role::Queen,
                (None, Some(_)) => false,
            }
        })
        .cloned()
}

/// Resolve a textual token to a legal move: SAN first, then UCI.
///
/// Trailing annotation glyphs (`!`, `?`) are ignored.
pub fn resolve_token(pos: &Chess, token: &str) -> Option<Move> {
    let cleaned = token.trim().trim_end_matches(['!', '?']);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(san) = cleaned.parse::<SanPlus>() {
        if let Ok(mv) = san.san.to_move(pos) {
            return Some(mv);
        }
    }

    match cleaned.parse::<UciMove>() {
        Ok(uci) => uci.to_move(pos).ok(),
        Err(_) => None,
    }
}

/// SAN of a legal move in `pos`.
pub fn san_of(pos: &Chess, mv: &Move) -> String {
    San::from_move(pos, mv.clone()).to_string()
}

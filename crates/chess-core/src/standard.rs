//! Standard-chess Position Authority backed by shakmaty.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::authority::{AuthorityError, AuthorityFactory, MoveResult, MoveSpec, PositionAuthority};
use crate::fen::{is_start_sentinel, normalize_fen};
use crate::notation;

/// Halfmove clock value at which the fifty-move rule applies.
const FIFTY_MOVE_PLIES: u32 = 100;

pub struct StandardAuthority {
    pos: Chess,
    /// Positions before each applied move, most recent last.
    undo_stack: Vec<Chess>,
    /// Normalized FEN of every position reached, for repetition counting.
    seen: Vec<String>,
}

impl StandardAuthority {
    /// Build from `"start"`, a blank string, or a FEN.
    pub fn from_position(position: &str) -> Result<Self, AuthorityError> {
        let trimmed = position.trim();
        let pos = if trimmed.is_empty() || is_start_sentinel(trimmed) {
            Chess::default()
        } else {
            let fen: Fen = trimmed
                .parse()
                .map_err(|e| AuthorityError::InvalidPosition(format!("'{}': {}", trimmed, e)))?;
            fen.into_position(CastlingMode::Standard)
                .map_err(|e| AuthorityError::InvalidPosition(format!("'{}': {}", trimmed, e)))?
        };

        let seen = vec![normalize_fen(&fen_of(&pos))];
        Ok(Self {
            pos,
            undo_stack: Vec::new(),
            seen,
        })
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    fn resolve(&self, spec: &MoveSpec) -> Option<Move> {
        match spec {
            MoveSpec::Notation(token) => notation::resolve_token(&self.pos, token),
            MoveSpec::Coordinates {
                origin,
                destination,
                promotion,
            } => {
                let from = notation::parse_square(origin)?;
                let to = notation::parse_square(destination)?;
                notation::find_coordinate_move(&self.pos, from, to, *promotion)
            }
        }
    }

    fn repetitions(&self) -> usize {
        let current = normalize_fen(&self.serialize());
        self.seen.iter().filter(|key| **key == current).count()
    }
}

impl PositionAuthority for StandardAuthority {
    fn apply_move(&mut self, spec: &MoveSpec) -> Result<Option<MoveResult>, AuthorityError> {
        let Some(mv) = self.resolve(spec) else {
            tracing::trace!(?spec, "rejected by rules");
            return Ok(None);
        };
        let (from, to) = notation::move_squares(&mv)
            .ok_or_else(|| AuthorityError::Internal(format!("unsupported move {:?}", mv)))?;

        let result = MoveResult {
            origin: from.to_string(),
            destination: to.to_string(),
            promotion: notation::promotion_char(&mv),
            notation: notation::san_of(&self.pos, &mv),
        };

        self.undo_stack.push(self.pos.clone());
        self.pos.play_unchecked(mv);
        self.seen.push(normalize_fen(&self.serialize()));

        Ok(Some(result))
    }

    fn serialize(&self) -> String {
        fen_of(&self.pos)
    }

    fn undo_last_move(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.pos = previous;
                self.seen.pop();
                true
            }
            None => false,
        }
    }

    fn is_checkmate(&self) -> Result<bool, AuthorityError> {
        Ok(self.pos.is_checkmate())
    }

    fn is_stalemate(&self) -> Result<bool, AuthorityError> {
        Ok(self.pos.is_stalemate())
    }

    fn is_draw(&self) -> Result<bool, AuthorityError> {
        Ok(self.pos.is_insufficient_material()
            || self.pos.halfmoves() >= FIFTY_MOVE_PLIES
            || self.repetitions() >= 3)
    }
}

fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Factory registered as `"shakmaty"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactory;

impl AuthorityFactory for StandardFactory {
    fn name(&self) -> &'static str {
        "shakmaty"
    }

    fn create(&self, position: &str) -> Result<Box<dyn PositionAuthority>, AuthorityError> {
        Ok(Box::new(StandardAuthority::from_position(position)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::STANDARD_START_FEN;

    fn play(auth: &mut StandardAuthority, tokens: &[&str]) {
        for token in tokens {
            auth.apply_move(&MoveSpec::notation(*token))
                .unwrap()
                .unwrap_or_else(|| panic!("{} should be legal", token));
        }
    }

    #[test]
    fn test_start_sentinel_and_blank() {
        let auth = StandardAuthority::from_position("start").unwrap();
        assert_eq!(auth.serialize(), STANDARD_START_FEN);
        let auth = StandardAuthority::from_position("  ").unwrap();
        assert_eq!(auth.serialize(), STANDARD_START_FEN);
    }

    #[test]
    fn test_invalid_fen_is_rejected() {
        let err = StandardAuthority::from_position("invalidFEN").err();
        assert!(matches!(err, Some(AuthorityError::InvalidPosition(_))));
    }

    #[test]
    fn test_apply_notation_reports_squares_and_san() {
        let mut auth = StandardAuthority::from_position("start").unwrap();
        let res = auth.apply_move(&MoveSpec::notation("d4")).unwrap().unwrap();
        assert_eq!(res.origin, "d2");
        assert_eq!(res.destination, "d4");
        assert_eq!(res.notation, "d4");
        assert_eq!(res.promotion, None);
        assert_eq!(
            auth.serialize(),
            "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_apply_coordinates() {
        let mut auth = StandardAuthority::from_position("start").unwrap();
        let res = auth
            .apply_move(&MoveSpec::coordinates("g1", "f3", None))
            .unwrap()
            .unwrap();
        assert_eq!(res.notation, "Nf3");
        assert!(auth
            .apply_move(&MoveSpec::coordinates("a1", "a2", None))
            .unwrap()
            .is_none());
        assert!(auth
            .apply_move(&MoveSpec::coordinates("zz", "a2", None))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_castling_uses_king_destination() {
        let mut auth =
            StandardAuthority::from_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let res = auth.apply_move(&MoveSpec::notation("O-O")).unwrap().unwrap();
        assert_eq!((res.origin.as_str(), res.destination.as_str()), ("e1", "g1"));
        assert!(auth.undo_last_move());

        let res = auth
            .apply_move(&MoveSpec::coordinates("e1", "c1", None))
            .unwrap()
            .unwrap();
        assert_eq!(res.notation, "O-O-O");
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        let mut auth = StandardAuthority::from_position(fen).unwrap();
        let res = auth
            .apply_move(&MoveSpec::coordinates("e7", "e8", None))
            .unwrap()
            .unwrap();
        assert_eq!(res.promotion, Some('q'));
        assert!(auth.undo_last_move());

        let res = auth
            .apply_move(&MoveSpec::coordinates("e7", "e8", Some('N')))
            .unwrap()
            .unwrap();
        assert_eq!(res.promotion, Some('n'));
        assert!(auth.undo_last_move());

        let res = auth.apply_move(&MoveSpec::notation("e7e8r")).unwrap().unwrap();
        assert_eq!(res.promotion, Some('r'));
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let mut auth = StandardAuthority::from_position("start").unwrap();
        assert!(!auth.undo_last_move());
        play(&mut auth, &["e4", "e5"]);
        assert!(auth.undo_last_move());
        assert!(auth.undo_last_move());
        assert_eq!(auth.serialize(), STANDARD_START_FEN);
        assert!(!auth.undo_last_move());
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        let mut auth = StandardAuthority::from_position("start").unwrap();
        play(&mut auth, &["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(auth.is_checkmate(), Ok(true));
        assert_eq!(auth.is_stalemate(), Ok(false));

        let stalemate = StandardAuthority::from_position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.is_stalemate(), Ok(true));
        assert_eq!(stalemate.is_checkmate(), Ok(false));
    }

    #[test]
    fn test_draw_conditions() {
        let bare_kings = StandardAuthority::from_position("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(bare_kings.is_draw(), Ok(true));

        let fifty = StandardAuthority::from_position("4k3/8/8/8/8/8/4P3/4K2R w - - 100 80").unwrap();
        assert_eq!(fifty.is_draw(), Ok(true));

        let mut repeat = StandardAuthority::from_position("start").unwrap();
        play(&mut repeat, &["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"]);
        assert_eq!(repeat.is_draw(), Ok(false));
        play(&mut repeat, &["Ng8"]);
        assert_eq!(repeat.is_draw(), Ok(true));
    }
}

//! Move validation engine.
//!
//! Holds the live position, a step cursor into the reference sequence and the
//! history of applied moves. User attempts are checked against the move the
//! sequence prescribes; the expected move is resolved by dry-applying the
//! reference token on a disposable shadow authority, so a query never touches
//! the live position.
//!
//! No public operation fails on bad input. Malformed construction input gives
//! a [`DegenerateEngine`]; only a rules authority that cannot be built at all
//! surfaces as [`EngineError::Unavailable`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use chess_core::fen::START_SENTINEL;
use chess_core::{
    AuthorityError, AuthorityFactory, MoveResult, MoveSpec, PositionAuthority, StandardFactory,
};

use crate::error::EngineError;
use crate::status::GameStatus;

/// A learner's drag from one square to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAttempt {
    #[serde(default, alias = "from")]
    pub origin: String,
    #[serde(default, alias = "to")]
    pub destination: String,
    #[serde(default)]
    pub promotion: Option<char>,
}

impl MoveAttempt {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: char) -> Self {
        self.promotion = Some(piece);
        self
    }

    fn is_complete(&self) -> bool {
        !self.origin.trim().is_empty() && !self.destination.trim().is_empty()
    }
}

/// The move the reference sequence prescribes at the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedMove {
    pub origin: String,
    pub destination: String,
    pub promotion: Option<char>,
}

impl ExpectedMove {
    /// Same squares, and no conflicting promotion piece. A promotion letter
    /// on a non-promoting move is ignored.
    pub fn matches(&self, attempt: &MoveAttempt) -> bool {
        if self.origin != attempt.origin || self.destination != attempt.destination {
            return false;
        }
        match (self.promotion, attempt.promotion) {
            (Some(wanted), Some(given)) => wanted.eq_ignore_ascii_case(&given),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub correct: bool,
    pub snapback: bool,
    pub position: String,
    pub expected: Option<ExpectedMove>,
}

impl MoveOutcome {
    fn rejected(position: String, expected: Option<ExpectedMove>) -> Self {
        Self {
            correct: false,
            snapback: true,
            position,
            expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub origin: String,
    pub destination: String,
    pub promotion: Option<char>,
    /// Position after the move.
    pub position: String,
}

/// Contract shared by the live and the degenerate engine.
pub trait MoveEngine {
    /// Next prescribed move, or `None` when exhausted or unresolvable.
    fn expected_move(&self) -> Option<ExpectedMove>;

    fn try_user_move(&mut self, attempt: Option<&MoveAttempt>) -> MoveOutcome;

    fn undo(&mut self) -> bool;

    /// Replay the reference move at the current step.
    fn redo(&mut self) -> bool;

    fn reset(&mut self);

    fn status(&self) -> GameStatus;

    fn position(&self) -> String;

    fn step(&self) -> usize;

    fn total(&self) -> usize;

    fn sequence(&self) -> &[String];

    /// Applied moves up to the current step.
    fn history(&self) -> &[HistoryEntry];
}

/// Build an engine for one card view.
///
/// A missing or blank position, a missing sequence, or a position the
/// authority cannot read all give a [`DegenerateEngine`]. `None` for the
/// factory selects the shakmaty authority.
pub fn create_engine(
    initial: Option<&str>,
    sequence: Option<&[String]>,
    factory: Option<Arc<dyn AuthorityFactory>>,
) -> Result<Box<dyn MoveEngine>, EngineError> {
    let (Some(initial), Some(sequence)) = (initial, sequence) else {
        warn!("Missing position or move sequence, using degenerate engine");
        return Ok(Box::new(DegenerateEngine));
    };
    if initial.trim().is_empty() {
        warn!("Blank initial position, using degenerate engine");
        return Ok(Box::new(DegenerateEngine));
    }

    let factory = factory.unwrap_or_else(|| Arc::new(StandardFactory));
    match SequenceEngine::new(initial, sequence.to_vec(), factory) {
        Ok(engine) => Ok(Box::new(engine)),
        Err(AuthorityError::InvalidPosition(msg)) => {
            warn!("Unreadable initial position ({msg}), using degenerate engine");
            Ok(Box::new(DegenerateEngine))
        }
        Err(e) => Err(EngineError::Unavailable(e)),
    }
}

pub struct SequenceEngine {
    factory: Arc<dyn AuthorityFactory>,
    initial: String,
    sequence: Vec<String>,
    live: Box<dyn PositionAuthority>,
    step: usize,
    history: Vec<HistoryEntry>,
}

impl SequenceEngine {
    pub fn new(
        initial: &str,
        sequence: Vec<String>,
        factory: Arc<dyn AuthorityFactory>,
    ) -> Result<Self, AuthorityError> {
        let live = factory.create(initial)?;
        debug!(
            authority = factory.name(),
            plies = sequence.len(),
            "Move engine created"
        );
        Ok(Self {
            factory,
            initial: initial.to_string(),
            sequence,
            live,
            step: 0,
            history: Vec::new(),
        })
    }

    fn record(&mut self, applied: MoveResult) {
        let entry = HistoryEntry {
            origin: applied.origin,
            destination: applied.destination,
            promotion: applied.promotion,
            position: self.live.serialize(),
        };
        self.history.truncate(self.step - 1);
        self.history.push(entry);
    }

    fn dry_apply(&self, token: &str) -> Result<Option<ExpectedMove>, AuthorityError> {
        let mut shadow = self.factory.create(&self.live.serialize())?;
        let result = shadow.apply_move(&MoveSpec::notation(token))?;
        Ok(result.map(|r| ExpectedMove {
            origin: r.origin,
            destination: r.destination,
            promotion: r.promotion,
        }))
    }
}

impl MoveEngine for SequenceEngine {
    fn expected_move(&self) -> Option<ExpectedMove> {
        let token = self.sequence.get(self.step)?;
        match self.dry_apply(token) {
            Ok(expected) => expected,
            Err(e) => {
                debug!(step = self.step, %token, "Expected move unresolved: {e}");
                None
            }
        }
    }

    fn try_user_move(&mut self, attempt: Option<&MoveAttempt>) -> MoveOutcome {
        let Some(attempt) = attempt.filter(|a| a.is_complete()) else {
            return MoveOutcome::rejected(self.live.serialize(), None);
        };

        let expected = self.expected_move();
        let Some(target) = expected.as_ref().filter(|e| e.matches(attempt)) else {
            trace!(
                step = self.step,
                from = %attempt.origin,
                to = %attempt.destination,
                "Attempt does not match the reference move"
            );
            return MoveOutcome::rejected(self.live.serialize(), expected);
        };

        let spec = MoveSpec::coordinates(
            attempt.origin.as_str(),
            attempt.destination.as_str(),
            target.promotion,
        );
        match self.live.apply_move(&spec) {
            Ok(Some(applied)) => {
                self.step += 1;
                trace!(step = self.step, san = %applied.notation, "Correct move");
                self.record(applied);
                MoveOutcome {
                    correct: true,
                    snapback: false,
                    position: self.live.serialize(),
                    expected,
                }
            }
            Ok(None) => {
                warn!(step = self.step, "Live position refused the expected move");
                MoveOutcome::rejected(self.live.serialize(), expected)
            }
            Err(e) => {
                warn!(step = self.step, "Live position failed to apply the expected move: {e}");
                MoveOutcome::rejected(self.live.serialize(), expected)
            }
        }
    }

    fn undo(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        if !self.live.undo_last_move() {
            warn!(step = self.step, "Rules authority had nothing to undo");
            return false;
        }
        self.step -= 1;
        self.history.truncate(self.step);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(token) = self.sequence.get(self.step).cloned() else {
            return false;
        };
        match self.live.apply_move(&MoveSpec::Notation(token)) {
            Ok(Some(applied)) => {
                self.step += 1;
                self.record(applied);
                true
            }
            Ok(None) => false,
            Err(e) => {
                debug!(step = self.step, "Redo failed: {e}");
                false
            }
        }
    }

    fn reset(&mut self) {
        match self.factory.create(&self.initial) {
            Ok(live) => self.live = live,
            Err(e) => {
                warn!("Could not rebuild the initial position ({e}), rewinding instead");
                while self.live.undo_last_move() {}
            }
        }
        self.step = 0;
        self.history.clear();
    }

    fn status(&self) -> GameStatus {
        let probe = || -> Result<GameStatus, AuthorityError> {
            if self.live.is_checkmate()? {
                return Ok(GameStatus::Checkmate);
            }
            if self.live.is_stalemate()? {
                return Ok(GameStatus::Stalemate);
            }
            if self.live.is_draw()? {
                return Ok(GameStatus::Draw);
            }
            Ok(GameStatus::Ongoing)
        };
        probe().unwrap_or_else(|e| {
            debug!("Status query failed: {e}");
            GameStatus::Unknown
        })
    }

    fn position(&self) -> String {
        self.live.serialize()
    }

    fn step(&self) -> usize {
        self.step
    }

    fn total(&self) -> usize {
        self.sequence.len()
    }

    fn sequence(&self) -> &[String] {
        &self.sequence
    }

    fn history(&self) -> &[HistoryEntry] {
        &self.history[..self.step.min(self.history.len())]
    }
}

/// Stand-in for an engine built from malformed input: every mutation fails
/// and the position stays at the start sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegenerateEngine;

impl MoveEngine for DegenerateEngine {
    fn expected_move(&self) -> Option<ExpectedMove> {
        None
    }

    fn try_user_move(&mut self, _attempt: Option<&MoveAttempt>) -> MoveOutcome {
        MoveOutcome::rejected(START_SENTINEL.to_string(), None)
    }

    fn undo(&mut self) -> bool {
        false
    }

    fn redo(&mut self) -> bool {
        false
    }

    fn reset(&mut self) {}

    fn status(&self) -> GameStatus {
        GameStatus::Unknown
    }

    fn position(&self) -> String {
        START_SENTINEL.to_string()
    }

    fn step(&self) -> usize {
        0
    }

    fn total(&self) -> usize {
        0
    }

    fn sequence(&self) -> &[String] {
        &[]
    }

    fn history(&self) -> &[HistoryEntry] {
        &[]
    }
}

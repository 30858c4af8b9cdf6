//! The Position Authority capability: the rules-aware collaborator that applies
//! moves, serializes positions and answers terminal-state queries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::standard::StandardFactory;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Rules authority unavailable: {0}")]
    Unavailable(String),

    #[error("Rules authority error: {0}")]
    Internal(String),
}

/// A move request handed to an authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveSpec {
    /// A textual token such as `Nf3`, `O-O` or `e7e8q`.
    Notation(String),
    Coordinates {
        origin: String,
        destination: String,
        promotion: Option<char>,
    },
}

impl MoveSpec {
    pub fn notation(token: impl Into<String>) -> Self {
        MoveSpec::Notation(token.into())
    }

    pub fn coordinates(
        origin: impl Into<String>,
        destination: impl Into<String>,
        promotion: Option<char>,
    ) -> Self {
        MoveSpec::Coordinates {
            origin: origin.into(),
            destination: destination.into(),
            promotion,
        }
    }
}

/// What an authority reports back for an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub origin: String,
    pub destination: String,
    pub promotion: Option<char>,
    /// SAN of the applied move.
    pub notation: String,
}

/// A rules engine holding one live position.
///
/// `apply_move` returns `Ok(None)` when the move is rejected; `Err` is reserved
/// for failures inside the authority itself. Terminal predicates default to
/// "not in that state" so implementers only provide what they can answer.
pub trait PositionAuthority {
    fn apply_move(&mut self, spec: &MoveSpec) -> Result<Option<MoveResult>, AuthorityError>;

    fn serialize(&self) -> String;

    /// Reverts the last applied move. Returns false when nothing was applied.
    fn undo_last_move(&mut self) -> bool;

    fn is_checkmate(&self) -> Result<bool, AuthorityError> {
        Ok(false)
    }

    fn is_stalemate(&self) -> Result<bool, AuthorityError> {
        Ok(false)
    }

    fn is_draw(&self) -> Result<bool, AuthorityError> {
        Ok(false)
    }
}

/// Builds authorities from serialized positions.
pub trait AuthorityFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn create(&self, position: &str) -> Result<Box<dyn PositionAuthority>, AuthorityError>;
}

/// Look up a factory by its registered name.
pub fn resolve_factory(name: &str) -> Option<Arc<dyn AuthorityFactory>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "shakmaty" | "standard" => Some(Arc::new(StandardFactory)),
        other => {
            tracing::warn!("No rules authority registered under '{}'", other);
            None
        }
    }
}

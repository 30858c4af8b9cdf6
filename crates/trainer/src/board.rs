//! Rendering adapter seam. The trainer never draws; it pushes positions into
//! a [`BoardSink`] and answers drops with a [`DropResponse`].

use serde::{Deserialize, Serialize};

use chess_core::fen::{is_start_sentinel, START_SENTINEL};

/// Receives the position the board should display.
pub trait BoardSink {
    fn set_position(&mut self, position: &str);
}

/// What the board does with a dropped piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResponse {
    /// Return the piece to its origin square.
    Snapback,
    Accept,
}

/// Animation speeds in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSpeeds {
    #[serde(rename = "move")]
    pub move_ms: u32,
    #[serde(rename = "snapback")]
    pub snapback_ms: u32,
    #[serde(rename = "trash")]
    pub trash_ms: u32,
}

impl Default for BoardSpeeds {
    fn default() -> Self {
        Self {
            move_ms: 150,
            snapback_ms: 120,
            trash_ms: 80,
        }
    }
}

/// Position string as handed to the board widget; the start sentinel is
/// passed through in its canonical spelling.
pub fn board_position(position: &str) -> &str {
    if is_start_sentinel(position) {
        START_SENTINEL
    } else {
        position
    }
}

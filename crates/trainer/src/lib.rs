//! Move trainer for spaced-repetition chess cards.
//!
//! A learner replays a reference line on a board; [`engine`] validates each
//! attempt against the line, [`session`] wires the engine to the board,
//! feedback and the host's pass/fail hook.

pub mod board;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod pieces;
pub mod session;
pub mod status;

pub use config::TrainerOptions;
pub use engine::{
    create_engine, DegenerateEngine, ExpectedMove, HistoryEntry, MoveAttempt, MoveEngine,
    MoveOutcome, SequenceEngine,
};
pub use error::{BridgeError, ConfigError, EngineError};
pub use session::{CardFields, DropOutcome, PendingReply, TrainerSession};
pub use status::GameStatus;

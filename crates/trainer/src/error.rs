//! Trainer error types

use chess_core::AuthorityError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// No usable rules authority: a configuration problem, not user input.
    #[error("Engine unavailable: {0}")]
    Unavailable(AuthorityError),

    #[error("No rules authority registered under '{0}'")]
    UnknownAuthority(String),
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Host command '{0}' failed: {1}")]
    Command(&'static str, String),

    #[error("Host channel closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

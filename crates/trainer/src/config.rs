//! Trainer options, from the host's JSON or from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::BoardSpeeds;
use crate::error::ConfigError;
use crate::pieces::PieceTheme;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainerOptions {
    /// Report pass/fail to the host automatically
    pub auto_answer: bool,

    /// Delay before the opponent reply, in milliseconds
    pub delay_ms: u64,

    /// Board animation speeds
    pub speeds: BoardSpeeds,

    /// Piece image template containing `{piece}`; bundled images when unset
    pub piece_theme: Option<String>,

    /// Play the opponent's reference move once the reply delay elapses
    pub auto_reply: bool,

    /// Registered name of the rules authority
    pub authority: String,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            auto_answer: true,
            delay_ms: 450,
            speeds: BoardSpeeds::default(),
            piece_theme: None,
            auto_reply: false,
            authority: "shakmaty".to_string(),
        }
    }
}

impl TrainerOptions {
    /// Parse host-supplied options; missing keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: Self = serde_json::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from `MOVE_TRAINER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let auto_answer = env::var("MOVE_TRAINER_AUTO_ANSWER")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.auto_answer);

        let delay_ms = env::var("MOVE_TRAINER_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.delay_ms);

        let auto_reply = env::var("MOVE_TRAINER_AUTO_REPLY")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.auto_reply);

        let piece_theme = env::var("MOVE_TRAINER_PIECE_THEME").ok();

        let authority =
            env::var("MOVE_TRAINER_AUTHORITY").unwrap_or_else(|_| defaults.authority.clone());

        let speeds = BoardSpeeds {
            move_ms: env_u32("MOVE_TRAINER_MOVE_SPEED").unwrap_or(defaults.speeds.move_ms),
            snapback_ms: env_u32("MOVE_TRAINER_SNAPBACK_SPEED")
                .unwrap_or(defaults.speeds.snapback_ms),
            trash_ms: env_u32("MOVE_TRAINER_TRASH_SPEED").unwrap_or(defaults.speeds.trash_ms),
        };

        let options = Self {
            auto_answer,
            delay_ms,
            speeds,
            piece_theme,
            auto_reply,
            authority,
        };
        options.validate()?;
        info!(
            authority = %options.authority,
            delay_ms = options.delay_ms,
            auto_answer = options.auto_answer,
            "Trainer options loaded"
        );
        Ok(options)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn piece_theme(&self) -> PieceTheme {
        match &self.piece_theme {
            Some(template) => PieceTheme::Template(template.clone()),
            None => PieceTheme::Bundled,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(template) = &self.piece_theme {
            if !template.contains("{piece}") {
                return Err(ConfigError::Invalid(format!(
                    "piece theme '{template}' has no {{piece}} placeholder"
                )));
            }
        }
        Ok(())
    }
}

fn env_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

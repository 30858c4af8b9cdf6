use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal state of the live position, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    Draw,
    /// The rules authority could not answer.
    Unknown,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw => "draw",
            GameStatus::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&GameStatus::Checkmate).unwrap(), "\"checkmate\"");
        let parsed: GameStatus = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(parsed, GameStatus::Unknown);
    }

    #[test]
    fn test_is_terminal() {
        assert!(GameStatus::Draw.is_terminal());
        assert!(!GameStatus::Ongoing.is_terminal());
        assert!(!GameStatus::Unknown.is_terminal());
        assert_eq!(GameStatus::Stalemate.to_string(), "stalemate");
    }
}

//! Piece image theming keyed by the board widget's piece codes (`wK`, `bP`, ...).

/// The twelve piece codes, white first.
pub const PIECE_KEYS: [&str; 12] = [
    "wK", "wQ", "wR", "wB", "wN", "wP", "bK", "bQ", "bR", "bB", "bN", "bP",
];

const BUNDLED_DIR: &str = "pieces/wikipedia";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PieceTheme {
    /// Images shipped with the widget.
    Bundled,
    /// A path template containing `{piece}`.
    Template(String),
}

impl PieceTheme {
    /// Image path for a piece code. Unknown codes map to an empty string.
    pub fn image_for(&self, piece: &str) -> String {
        if !PIECE_KEYS.contains(&piece) {
            return String::new();
        }
        match self {
            PieceTheme::Bundled => format!("{BUNDLED_DIR}/{piece}.png"),
            PieceTheme::Template(template) => template.replace("{piece}", piece),
        }
    }
}

//! Visual feedback: progress, the played-move list and the hint arrow drawn
//! after a wrong move. Everything here produces data or markup; a
//! [`FeedbackSink`] decides where it goes.

use std::fmt::Write;

use chess_core::notation::square_coords;

use crate::engine::ExpectedMove;

/// Board size used when the host cannot measure the board.
pub const DEFAULT_BOARD_PX: f64 = 340.0;

pub trait FeedbackSink {
    /// Flash the board and, when known, point at the expected move.
    fn flash_wrong(&mut self, hint: Option<&ExpectedMove>);

    fn progress(&mut self, step: usize, total: usize);

    fn list_played(&mut self, sequence: &[String], step: usize);

    fn clear_annotations(&mut self);
}

/// `Move 3 of 10`; never counts past the total.
pub fn progress_label(step: usize, total: usize) -> String {
    format!("Move {} of {}", (step + 1).min(total), total)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveListItem {
    Number(usize),
    Played(String),
    /// Placeholder for the move the learner has to find.
    Pending,
}

/// Played moves with move numbers before white plies, then a pending marker
/// while the sequence is unfinished. Future moves are never listed.
pub fn move_list(sequence: &[String], step: usize) -> Vec<MoveListItem> {
    let step = step.min(sequence.len());
    let mut items = Vec::with_capacity(step + step / 2 + 2);
    for (i, san) in sequence[..step].iter().enumerate() {
        if i % 2 == 0 {
            items.push(MoveListItem::Number(i / 2 + 1));
        }
        items.push(MoveListItem::Played(san.clone()));
    }
    if step < sequence.len() {
        if step % 2 == 0 {
            items.push(MoveListItem::Number(step / 2 + 1));
        }
        items.push(MoveListItem::Pending);
    }
    items
}

pub fn render_move_list_html(items: &[MoveListItem]) -> String {
    let mut html = String::new();
    for item in items {
        match item {
            MoveListItem::Number(n) => {
                let _ = write!(html, "<span style=\"color:#888;\">{n}. </span>");
            }
            MoveListItem::Played(san) => {
                let _ = write!(html, "<span style=\"color:#333;\">{}</span> ", escape_html(san));
            }
            MoveListItem::Pending => {
                html.push_str(
                    "<span style=\"color:#1976d2;font-weight:700;\">&#8226;&#8226;&#8226;</span>",
                );
            }
        }
    }
    html.trim().to_string()
}

pub fn render_move_list_text(items: &[MoveListItem]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            MoveListItem::Number(n) => format!("{n}."),
            MoveListItem::Played(san) => san.clone(),
            MoveListItem::Pending => "...".to_string(),
        })
        .collect();
    parts.join(" ")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub cx: f64,
    pub cy: f64,
}

/// Pixel rectangle of a square on a board `size` pixels wide. An unmeasured
/// board (zero, negative or NaN size) is drawn at [`DEFAULT_BOARD_PX`].
pub fn square_rect(square: &str, size: f64, orientation: Orientation) -> Option<SquareRect> {
    let (file, rank) = square_coords(square)?;
    let size = if size.is_finite() && size > 0.0 {
        size
    } else {
        DEFAULT_BOARD_PX
    };
    let (col, row) = match orientation {
        Orientation::White => (file, 7 - rank),
        Orientation::Black => (7 - file, rank),
    };
    let s = size / 8.0;
    let (col, row) = (f64::from(col), f64::from(row));
    Some(SquareRect {
        x: col * s,
        y: row * s,
        w: s,
        h: s,
        cx: (col + 0.5) * s,
        cy: (row + 0.5) * s,
    })
}

/// Highlighted origin and destination joined by an arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintArrow {
    pub from: SquareRect,
    pub to: SquareRect,
}

impl HintArrow {
    pub fn new(hint: &ExpectedMove, size: f64, orientation: Orientation) -> Option<Self> {
        Some(Self {
            from: square_rect(&hint.origin, size, orientation)?,
            to: square_rect(&hint.destination, size, orientation)?,
        })
    }

    /// Annotation layer markup; relies on [`arrowhead_defs`] being present.
    pub fn to_svg(&self) -> String {
        let (a, b) = (self.from, self.to);
        format!(
            concat!(
                "<rect class=\"hint-from\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                "<rect class=\"hint-to\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                "<line class=\"hint\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" marker-end=\"url(#arrowhead)\"/>"
            ),
            a.x, a.y, a.w, a.h, b.x, b.y, b.w, b.h, a.cx, a.cy, b.cx, b.cy
        )
    }
}

pub fn arrowhead_defs() -> &'static str {
    concat!(
        "<defs><marker id=\"arrowhead\" orient=\"auto\" markerWidth=\"8\" markerHeight=\"8\" ",
        "refX=\"2\" refY=\"2\"><path d=\"M0,0 L4,2 L0,4 z\"/></marker></defs>"
    )
}

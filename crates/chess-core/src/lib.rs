//! Chess plumbing shared by the move trainer.
//!
//! The trainer never inspects a position itself: everything rules-aware goes
//! through a [`PositionAuthority`], and [`standard`] provides the default one
//! on top of shakmaty.

pub mod authority;
pub mod fen;
pub mod notation;
pub mod sequence;
pub mod standard;

pub use authority::{
    resolve_factory, AuthorityError, AuthorityFactory, MoveResult, MoveSpec, PositionAuthority,
};
pub use standard::{StandardAuthority, StandardFactory};

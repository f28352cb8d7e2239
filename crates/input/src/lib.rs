//! Input: held buttons and mouse motion folded into one `FrameInput` per tick,
//! plus discrete `Action`s for the screen flow and toggles.
//!
//! # Invariants
//! - The kernel consumes `FrameInput` and `Action`, never raw window events.
//! - Look motion accumulates between frames and is consumed exactly once.

pub mod action;
pub mod state;

pub use action::Action;
pub use state::{Button, FrameInput, InputState};

//! Developer tooling: read-only inspection of a running simulation.
//!
//! # Invariants
//! - Tools never mutate game state.

mod inspector;

pub use inspector::{DoorInfo, KeyInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "labyrinth-tools v0.1.0"
}

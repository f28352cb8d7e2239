//! Maze: tile grid model and the two-pass maze compiler.
//!
//! # Invariants
//! - Every non-empty structural tile is covered by exactly one emitted block.
//! - Collision volumes are index-aligned with structural instances.
//! - Compiling the same grid twice yields equal tables.

mod bindings;
mod compiler;
mod config;
mod grid;
mod layout;
mod tile;

pub use bindings::{DEFAULT_BINDINGS, KeyDoorBinding, door_code_for_key};
pub use compiler::{Axis, CompiledMaze, DoorSpec, KeySpec, MazeCompiler, Run};
pub use config::MazeConfig;
pub use grid::{CellCoord, GridError, TileGrid};
pub use layout::{DEFAULT_COLS, DEFAULT_ROWS, default_maze};
pub use tile::{HOSTILE_SPAWN, TileKind, WALL};

pub fn crate_info() -> &'static str {
    "labyrinth-maze v0.1.0"
}

//! Game kernel: authoritative gameplay state and the per-frame simulation.
//!
//! # Invariants
//! - The `Scene` aggregate owns every mutable table; subsystems borrow it.
//! - Doors only move forward through Closed, Rising, Risen.
//! - A key is collected at most once.
//! - One tick per rendered frame, single-threaded, never blocking.

pub mod collision;
pub mod config;
pub mod doors;
pub mod frame;
pub mod hostile;
pub mod player;
pub mod scene;

pub use collision::{COLLISION_SLOP, resolve};
pub use config::{ConfigError, GameConfig, Tuning};
pub use doors::KeyDoorController;
pub use frame::{FrameSimulator, HudSnapshot, Screen};
pub use hostile::EntityAnimator;
pub use player::PlayerState;
pub use scene::{Door, DoorPhase, DynamicEntity, Key, Scene, SceneEvent};

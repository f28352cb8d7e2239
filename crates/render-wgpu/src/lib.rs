//! wgpu render backend for the labyrinth.
//!
//! Draws the shared cube and plane meshes instanced from the uploaded
//! `GpuObjectAttribs` table, coloured from a material palette and lit by a
//! camera-mounted flashlight.
//!
//! # Invariants
//! - Renderer never mutates game state.
//! - One geometry upload at startup; one instance upload per frame.

mod camera;
mod gpu;
mod shaders;

pub use camera::FirstPersonCamera;
pub use gpu::{WgpuBackend, WgpuRenderer};
pub use shaders::{MATERIAL_COUNT, MATERIAL_PALETTE};

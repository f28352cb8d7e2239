use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Placement constants for turning tiles into world geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// World units per grid cell.
    pub spacing: f32,
    /// Half-height of wall boxes; collision volumes span `0..wall_height`.
    pub wall_height: f32,
    /// Render boxes sit this far below `wall_height` so they sink into the ground.
    pub wall_sink: f32,
    /// Half-size of a key cube.
    pub key_half_size: f32,
    /// Height of the key's lower face above the ground.
    pub key_hover: f32,
    pub ceiling_height: f32,
    pub ceiling_thickness: f32,
    /// Ground plane sits slightly below zero.
    pub ground_offset: f32,
    /// Hostile start when the grid has no spawn marker.
    pub hostile_spawn: Vec3,
    /// Height the hostile is placed at when spawned from a marker.
    pub hostile_height: f32,
    /// Initial scale; the hostile grows to full size on its first update.
    pub hostile_hidden_scale: f32,
    /// Decoration codes whose runs are registered as spinning dynamic entities.
    pub dynamic_codes: Vec<u8>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            spacing: 2.0,
            wall_height: 3.0,
            wall_sink: 0.2,
            key_half_size: 0.5,
            key_hover: 2.0,
            ceiling_height: 6.0,
            ceiling_thickness: 0.5,
            ground_offset: -0.2,
            hostile_spawn: Vec3::new(0.0, 3.0, -20.0),
            hostile_height: 3.0,
            hostile_hidden_scale: 0.01,
            dynamic_codes: Vec::new(),
        }
    }
}

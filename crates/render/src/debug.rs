use glam::Vec3;
use labyrinth_common::Aabb;
use labyrinth_kernel::{FrameSimulator, PlayerState};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    /// Half-width of the text map, in map cells.
    pub map_radius: i32,
    /// World units per map cell.
    pub map_cell: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, 0.0),
            target: Vec3::new(1.0, 3.0, 0.0),
            fov_degrees: 45.0,
            map_radius: 8,
            map_cell: 2.0,
        }
    }
}

impl RenderView {
    pub fn from_player(player: &PlayerState) -> Self {
        Self {
            eye: player.position,
            target: player.position + player.forward(),
            ..Self::default()
        }
    }
}

/// Renderer-agnostic interface for views that read the simulation directly.
pub trait Renderer {
    type Output;

    fn render(&self, sim: &FrameSimulator, view: &RenderView) -> Self::Output;
}

/// Text renderer: HUD values plus a top-down map around the eye.
///
/// Map legend: `@` player, `H` hostile, `k` key, `D` door, `#` wall.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn contains_xz(b: &Aabb, x: f32, z: f32) -> bool {
    !b.is_degenerate() && x >= b.min.x && x <= b.max.x && z >= b.min.z && z <= b.max.z
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, sim: &FrameSimulator, view: &RenderView) -> String {
        let scene = sim.scene();
        let hud = sim.hud();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "=== Labyrinth (tick={}, screen={:?}) ===",
            sim.tick_count(),
            hud.screen
        );
        let _ = writeln!(
            out,
            "Health: {}/{}{}  Keys: {}/{}  Flashlight: {}",
            hud.health,
            hud.max_health,
            if hud.game_over { " GAME OVER" } else { "" },
            hud.keys_collected,
            hud.keys_total,
            if hud.flashlight { "on" } else { "off" }
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );
        let _ = writeln!(
            out,
            "Instances: {}  Walls: {}  Doors open: {}/{}",
            scene.objects().len(),
            scene.walls().iter().filter(|w| !w.is_degenerate()).count(),
            scene.doors().iter().filter(|d| d.opened).count(),
            scene.doors().len()
        );

        let hostile = scene.hostile_position();
        let half = view.map_cell * 0.5;
        for j in -view.map_radius..=view.map_radius {
            for i in -view.map_radius..=view.map_radius {
                let x = view.eye.x + i as f32 * view.map_cell;
                let z = view.eye.z + j as f32 * view.map_cell;
                let near = |p: Vec3| (p.x - x).abs() <= half && (p.z - z).abs() <= half;

                let c = if i == 0 && j == 0 {
                    '@'
                } else if near(hostile) {
                    'H'
                } else if scene
                    .keys()
                    .iter()
                    .any(|k| !k.collected && contains_xz(&k.bounds, x, z))
                {
                    'k'
                } else if scene
                    .doors()
                    .iter()
                    .any(|d| contains_xz(scene.wall(d.wall), x, z))
                {
                    'D'
                } else if scene.walls().iter().any(|w| contains_xz(w, x, z)) {
                    '#'
                } else {
                    '.'
                };
                out.push(c);
            }
            out.push('\n');
        }

        out
    }
}

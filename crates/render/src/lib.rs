//! Rendering adapter: the narrow interface the game drives each frame.
//!
//! # Invariants
//! - Renderers read the instance table; they never mutate game state.
//! - `GpuObjectAttribs` is the byte layout uploaded per instance.
//!
//! # Backends
//! `RecordingBackend` and `DebugTextRenderer` need no GPU and back the CLI
//! and tests. The wgpu backend lives in its own crate.

mod backend;
mod debug;
mod geometry;
mod gpu_types;

pub use backend::{
    MeshHandle, RecordingBackend, RenderBackend, RenderCall, prepare_scene, submit_frame,
};
pub use debug::{DebugTextRenderer, RenderView, Renderer};
pub use geometry::{SceneGeometry, Vertex, cube_mesh, plane_mesh};
pub use gpu_types::GpuObjectAttribs;

pub fn crate_info() -> &'static str {
    "labyrinth-render v0.1.0"
}

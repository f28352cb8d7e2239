use crate::geometry::{SceneGeometry, Vertex};
use crate::gpu_types::GpuObjectAttribs;
use labyrinth_common::{InstanceGroup, MeshLayout, MeshRange, ObjectInstance};
use std::ops::Range;

/// Opaque handle to a geometry buffer pair owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// What the game needs from a graphics device.
///
/// Called from the single frame loop only. Implementations own every GPU
/// resource; the game only ever holds `MeshHandle`s.
pub trait RenderBackend {
    fn create_geometry_buffers(&mut self, vertices: &[Vertex], indices: &[u32]) -> MeshHandle;

    /// Build the bottom-level structure for `mesh`. Raster-only backends may
    /// treat this as a no-op.
    fn create_acceleration_structure(&mut self, mesh: MeshHandle);

    fn update_top_level_structure(&mut self, instances: &[ObjectInstance]);

    /// Replace the instance buffer contents with `bytes` (packed `GpuObjectAttribs`).
    fn upload_instance_buffer(&mut self, bytes: &[u8]);

    /// Draw `instances` of the sub-mesh `range` out of `mesh`.
    fn draw_instanced(&mut self, mesh: MeshHandle, range: MeshRange, instances: Range<u32>);
}

/// Upload the shared geometry once and build its acceleration structure.
pub fn prepare_scene<B: RenderBackend>(backend: &mut B, geometry: &SceneGeometry) -> MeshHandle {
    let mesh = backend.create_geometry_buffers(&geometry.vertices, &geometry.indices);
    backend.create_acceleration_structure(mesh);
    tracing::debug!(
        vertices = geometry.vertices.len(),
        indices = geometry.indices.len(),
        "scene geometry prepared"
    );
    mesh
}

/// Push one frame: refresh the top-level structure, upload every instance,
/// then one draw per non-empty instancing group.
pub fn submit_frame<B: RenderBackend>(
    backend: &mut B,
    mesh: MeshHandle,
    layout: &MeshLayout,
    instances: &[ObjectInstance],
    groups: &[InstanceGroup],
) {
    backend.update_top_level_structure(instances);
    let attribs: Vec<GpuObjectAttribs> = instances.iter().map(GpuObjectAttribs::from).collect();
    backend.upload_instance_buffer(bytemuck::cast_slice(&attribs));
    for group in groups.iter().filter(|g| g.count > 0) {
        backend.draw_instanced(mesh, layout.range(group.mesh), group.range());
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateGeometry { vertices: usize, indices: usize },
    CreateAccelerationStructure(MeshHandle),
    UpdateTopLevel { instances: usize },
    UploadInstances { bytes: usize },
    Draw {
        mesh: MeshHandle,
        range: MeshRange,
        instances: Range<u32>,
    },
}

/// Backend that records every call instead of touching a GPU.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<RenderCall>,
    next_mesh: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = &RenderCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Draw { .. }))
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn create_geometry_buffers(&mut self, vertices: &[Vertex], indices: &[u32]) -> MeshHandle {
        let mesh = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.calls.push(RenderCall::CreateGeometry {
            vertices: vertices.len(),
            indices: indices.len(),
        });
        mesh
    }

    fn create_acceleration_structure(&mut self, mesh: MeshHandle) {
        self.calls.push(RenderCall::CreateAccelerationStructure(mesh));
    }

    fn update_top_level_structure(&mut self, instances: &[ObjectInstance]) {
        self.calls.push(RenderCall::UpdateTopLevel {
            instances: instances.len(),
        });
    }

    fn upload_instance_buffer(&mut self, bytes: &[u8]) {
        self.calls.push(RenderCall::UploadInstances { bytes: bytes.len() });
    }

    fn draw_instanced(&mut self, mesh: MeshHandle, range: MeshRange, instances: Range<u32>) {
        self.calls.push(RenderCall::Draw {
            mesh,
            range,
            instances,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_maze::{MazeCompiler, TileGrid};

    #[test]
    fn prepare_creates_one_mesh_with_blas() {
        let mut backend = RecordingBackend::new();
        let mesh = prepare_scene(&mut backend, &SceneGeometry::new());
        assert_eq!(
            backend.calls,
            vec![
                RenderCall::CreateGeometry {
                    vertices: 28,
                    indices: 42
                },
                RenderCall::CreateAccelerationStructure(mesh),
            ]
        );
    }

    #[test]
    fn frame_uploads_table_then_draws_groups() {
        let grid: TileGrid = "1 10\n20 0".parse().unwrap();
        let maze = MazeCompiler::default().compile(&grid);
        let geometry = SceneGeometry::new();
        let mut backend = RecordingBackend::new();
        let mesh = prepare_scene(&mut backend, &geometry);
        backend.clear();

        submit_frame(&mut backend, mesh, &geometry.layout, &maze.objects, &maze.groups);

        assert_eq!(
            backend.calls[0],
            RenderCall::UpdateTopLevel {
                instances: maze.objects.len()
            }
        );
        assert_eq!(
            backend.calls[1],
            RenderCall::UploadInstances {
                bytes: maze.objects.len() * 128
            }
        );
        let draws: Vec<&RenderCall> = backend.draw_calls().collect();
        assert_eq!(draws.len(), 4);
        assert_eq!(
            draws[1],
            &RenderCall::Draw {
                mesh,
                range: geometry.layout.plane,
                instances: maze.ground.0..maze.ground.0 + 1,
            }
        );
    }

    #[test]
    fn empty_groups_are_not_drawn() {
        let grid: TileGrid = "0".parse().unwrap();
        let maze = MazeCompiler::default().compile(&grid);
        let geometry = SceneGeometry::new();
        let mut backend = RecordingBackend::new();
        submit_frame(&mut backend, MeshHandle(0), &geometry.layout, &maze.objects, &maze.groups);
        assert_eq!(backend.draw_calls().count(), 3);
    }
}

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use labyrinth_common::{MeshLayout, MeshRange};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Push one quad centred at `normal`, spanned by `u` and `v` with `u x v == normal`.
fn push_face(vertices: &mut Vec<Vertex>, indices: &mut Vec<u32>, normal: Vec3, u: Vec3, v: Vec3) {
    let base = vertices.len() as u32;
    for (a, b) in CORNERS {
        vertices.push(Vertex {
            position: (normal + u * a + v * b).to_array(),
            normal: normal.to_array(),
            uv: [(a + 1.0) * 0.5, (b + 1.0) * 0.5],
        });
    }
    indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
}

/// Cube spanning -1..1 on every axis, so its model scale is its half extent.
pub fn cube_mesh() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    #[rustfmt::skip]
    let faces = [
        (Vec3::Z,     Vec3::X,     Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X,     Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z,     Vec3::Y),
        (Vec3::Y,     Vec3::X,     Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X,     Vec3::Z),
    ];
    for (n, u, v) in faces {
        push_face(&mut vertices, &mut indices, n, u, v);
    }
    (vertices, indices)
}

/// Upward-facing plane spanning -1..1 on X and Z at y = 0.
pub fn plane_mesh() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(4);
    let mut indices = Vec::with_capacity(6);
    push_face(&mut vertices, &mut indices, Vec3::ZERO, Vec3::X, Vec3::NEG_Z);
    for v in &mut vertices {
        v.normal = Vec3::Y.to_array();
    }
    (vertices, indices)
}

/// Every mesh packed into one vertex and one index buffer.
///
/// Indices are relative to each mesh's `first_vertex`; draws pass it as the
/// base vertex.
#[derive(Debug, Clone)]
pub struct SceneGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub layout: MeshLayout,
}

impl SceneGeometry {
    pub fn new() -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut append = |(v, i): (Vec<Vertex>, Vec<u32>)| {
            let range = MeshRange {
                first_index: indices.len() as u32,
                num_indices: i.len() as u32,
                first_vertex: vertices.len() as u32,
                num_vertices: v.len() as u32,
            };
            vertices.extend(v);
            indices.extend(i);
            range
        };
        let cube = append(cube_mesh());
        let plane = append(plane_mesh());
        Self {
            vertices,
            indices,
            layout: MeshLayout { cube, plane },
        }
    }
}

impl Default for SceneGeometry {
    fn default() -> Self {
        Self::new()
    }
}

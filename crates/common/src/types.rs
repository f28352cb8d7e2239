use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Index into the dense, insertion-ordered object-instance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIndex(pub u32);

impl ObjectIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the wall-volume table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallIndex(pub u32);

impl WallIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Process-unique door identifier, allocated monotonically at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorId(pub u32);

/// A handle referencing a mesh in the shared geometry buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u32);

impl MeshId {
    pub const CUBE: Self = Self(0);
    pub const PLANE: Self = Self(1);
}

/// A handle referencing a material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Ceiling texture slot (shared with tile code 9).
    pub const CEILING: Self = Self(8);
    /// Hostile entity slot (tile code 18).
    pub const HOSTILE: Self = Self(17);
    /// Ground material, placed after the 27 cube slots.
    pub const GROUND: Self = Self(27);

    /// Cube tiles use one material slot per code, starting at code 1.
    pub fn for_tile(code: u8) -> Self {
        Self(u32::from(code.saturating_sub(1)))
    }
}

/// Axis-aligned box in world space. Used for wall collision and key pickup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Zero-extent box at the origin. A cleared door volume takes this value.
    pub const EMPTY: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Per-axis clamp of `point` into the box.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.min(self.max).max(self.min)
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Location of one mesh inside the shared vertex/index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRange {
    pub first_index: u32,
    pub num_indices: u32,
    pub first_vertex: u32,
    pub num_vertices: u32,
}

/// Where the cube and plane meshes live in the shared geometry buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshLayout {
    pub cube: MeshRange,
    pub plane: MeshRange,
}

impl Default for MeshLayout {
    /// Cube (24 vertices, 36 indices) first, plane (4 vertices, 6 indices) after it.
    fn default() -> Self {
        Self {
            cube: MeshRange {
                first_index: 0,
                num_indices: 36,
                first_vertex: 0,
                num_vertices: 24,
            },
            plane: MeshRange {
                first_index: 36,
                num_indices: 6,
                first_vertex: 24,
                num_vertices: 4,
            },
        }
    }
}

impl MeshLayout {
    pub fn range(&self, mesh: MeshId) -> MeshRange {
        if mesh == MeshId::PLANE {
            self.plane
        } else {
            self.cube
        }
    }
}

/// Inverse-transpose of the upper 3x3. Falls back to the plain 3x3 when the
/// model is singular (zero-scaled instances).
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(model);
    if m.determinant().abs() > f32::EPSILON {
        m.inverse().transpose()
    } else {
        m
    }
}

/// One placed piece of geometry in the renderer's instance buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub model: Mat4,
    pub normal: Mat3,
    pub material: MaterialId,
    pub mesh: MeshId,
    pub first_index: u32,
    pub first_vertex: u32,
}

impl ObjectInstance {
    pub fn new(model: Mat4, material: MaterialId, mesh: MeshId, layout: &MeshLayout) -> Self {
        let range = layout.range(mesh);
        Self {
            model,
            normal: normal_matrix(model),
            material,
            mesh,
            first_index: range.first_index,
            first_vertex: range.first_vertex,
        }
    }

    /// Replace the model matrix and recompute the normal matrix.
    pub fn set_model(&mut self, model: Mat4) {
        self.model = model;
        self.normal = normal_matrix(model);
    }

    pub fn translation(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }

    /// Zero-scale instances are treated as removed by the renderer.
    pub fn is_hidden(&self) -> bool {
        Mat3::from_mat4(self.model) == Mat3::ZERO
    }

    /// Collapse the instance to zero scale, keeping the homogeneous row intact.
    pub fn hide(&mut self) {
        self.set_model(Mat4::from_scale(Vec3::ZERO));
    }
}

/// A contiguous range of instances sharing one mesh, drawn with one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceGroup {
    pub mesh: MeshId,
    pub first: u32,
    pub count: u32,
}

impl InstanceGroup {
    pub fn range(&self) -> Range<u32> {
        self.first..self.first + self.count
    }
}

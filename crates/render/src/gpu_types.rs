use bytemuck::{Pod, Zeroable};
use labyrinth_common::ObjectInstance;

/// Per-instance data as uploaded to the GPU. 128 bytes, std430-compatible.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuObjectAttribs {
    pub model: [[f32; 4]; 4],
    /// 3x3 normal matrix, each column padded to a vec4.
    pub normal: [[f32; 4]; 3],
    pub material: u32,
    pub mesh: u32,
    pub first_index: u32,
    pub first_vertex: u32,
}

impl From<&ObjectInstance> for GpuObjectAttribs {
    fn from(obj: &ObjectInstance) -> Self {
        let n = obj.normal;
        Self {
            model: obj.model.to_cols_array_2d(),
            normal: [
                n.x_axis.extend(0.0).to_array(),
                n.y_axis.extend(0.0).to_array(),
                n.z_axis.extend(0.0).to_array(),
            ],
            material: obj.material.0,
            mesh: obj.mesh.0,
            first_index: obj.first_index,
            first_vertex: obj.first_vertex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use labyrinth_common::{MaterialId, MeshId, MeshLayout};

    #[test]
    fn layout_is_128_bytes() {
        assert_eq!(std::mem::size_of::<GpuObjectAttribs>(), 128);
    }

    #[test]
    fn converts_instance_fields() {
        let layout = MeshLayout::default();
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let obj = ObjectInstance::new(model, MaterialId(9), MeshId::PLANE, &layout);
        let gpu = GpuObjectAttribs::from(&obj);
        assert_eq!(gpu.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(gpu.normal[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(gpu.material, 9);
        assert_eq!(gpu.mesh, 1);
        assert_eq!(gpu.first_index, layout.plane.first_index);
        assert_eq!(gpu.first_vertex, layout.plane.first_vertex);
    }

    #[test]
    fn casts_to_bytes() {
        let attribs = [GpuObjectAttribs::zeroed(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&attribs);
        assert_eq!(bytes.len(), 384);
    }
}

use crate::camera::FirstPersonCamera;
use crate::shaders::{self, MATERIAL_COUNT, MATERIAL_PALETTE};
use bytemuck::{Pod, Zeroable};
use labyrinth_common::{MeshRange, ObjectInstance};
use labyrinth_render::{GpuObjectAttribs, MeshHandle, RenderBackend, Vertex};
use std::ops::Range;
use wgpu::util::DeviceExt;

const FLASHLIGHT_RANGE: f32 = 30.0;
const FLASHLIGHT_INTENSITY: f32 = 0.5;
/// cos(20 degrees)
const FLASHLIGHT_CONE_COS: f32 = 0.939_692_6;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    flashlight_dir: [f32; 4],
    flashlight: [f32; 4],
    palette: [[f32; 4]; MATERIAL_COUNT],
}

impl FrameUniforms {
    fn new(camera: &FirstPersonCamera, flashlight_on: bool) -> Self {
        let intensity = if flashlight_on { FLASHLIGHT_INTENSITY } else { 0.0 };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(0.0).to_array(),
            flashlight_dir: camera.forward().extend(intensity).to_array(),
            flashlight: [FLASHLIGHT_CONE_COS, FLASHLIGHT_RANGE, 0.0, 0.0],
            palette: MATERIAL_PALETTE,
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct DrawCmd {
    mesh: MeshHandle,
    range: MeshRange,
    instances: Range<u32>,
}

/// wgpu raster renderer for the maze.
///
/// Geometry and instance uploads go through `RenderBackend` (see
/// [`WgpuRenderer::backend`]); draws are queued and replayed by `render`.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u64,
    top_level_instances: usize,
    draws: Vec<DrawCmd>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::new(&FirstPersonCamera::default(), false)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("maze_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("maze_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MAZE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("maze_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<GpuObjectAttribs>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                            9 => Float32x4,
                            10 => Uint32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let instance_capacity = 1024 * std::mem::size_of::<GpuObjectAttribs>() as u64;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);
        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: Vec::new(),
            instance_buffer,
            instance_capacity,
            top_level_instances: 0,
            draws: Vec::new(),
            depth_texture,
            surface_format,
        }
    }

    /// Borrow the renderer as a `RenderBackend` for uploads and draw queuing.
    pub fn backend<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
    ) -> WgpuBackend<'a> {
        WgpuBackend {
            renderer: self,
            device,
            queue,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Instances seen by the last top-level update.
    pub fn instance_count(&self) -> usize {
        self.top_level_instances
    }

    /// Clear the target and replay the queued draws.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &FirstPersonCamera,
        flashlight_on: bool,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(camera, flashlight_on)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("maze_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("maze_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for draw in &self.draws {
                let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
                    tracing::warn!(mesh = draw.mesh.0, "draw with unknown mesh skipped");
                    continue;
                };
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                let range = draw.range;
                let indices = range.first_index..range.first_index + range.num_indices;
                pass.draw_indexed(indices, range.first_vertex as i32, draw.instances.clone());
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        self.draws.clear();
    }

    fn create_instance_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Frame-scoped view of a `WgpuRenderer` with the device and queue it needs.
pub struct WgpuBackend<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl RenderBackend for WgpuBackend<'_> {
    fn create_geometry_buffers(&mut self, vertices: &[Vertex], indices: &[u32]) -> MeshHandle {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let handle = MeshHandle(self.renderer.meshes.len() as u32);
        self.renderer.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
        });
        handle
    }

    fn create_acceleration_structure(&mut self, mesh: MeshHandle) {
        // Raster path: visibility comes from the depth buffer.
        tracing::debug!(mesh = mesh.0, "acceleration structure not needed for raster backend");
    }

    fn update_top_level_structure(&mut self, instances: &[ObjectInstance]) {
        self.renderer.top_level_instances = instances.len();
    }

    fn upload_instance_buffer(&mut self, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed > self.renderer.instance_capacity {
            let capacity = needed.next_power_of_two();
            tracing::debug!(capacity, "growing instance buffer");
            self.renderer.instance_buffer =
                WgpuRenderer::create_instance_buffer(self.device, capacity);
            self.renderer.instance_capacity = capacity;
        }
        if !bytes.is_empty() {
            self.queue
                .write_buffer(&self.renderer.instance_buffer, 0, bytes);
        }
    }

    fn draw_instanced(&mut self, mesh: MeshHandle, range: MeshRange, instances: Range<u32>) {
        self.renderer.draws.push(DrawCmd {
            mesh,
            range,
            instances,
        });
    }
}

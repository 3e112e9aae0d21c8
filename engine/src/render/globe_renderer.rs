//! Globe Renderer
//!
//! The wgpu frame sink. One frame is two passes:
//! - scene: star backdrop, lit globe, photo planes (with depth)
//! - overlay: label boxes and text, alpha blended, no depth
//!
//! The surface texture acquired by the scene pass is presented once the
//! overlay is drawn.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use winit::window::Window;

use super::frame_sink::{FrameSink, FrameView};
use super::gpu_context::{DEPTH_FORMAT, GpuContext, GpuContextConfig};
use super::label_layer::{LabelMesh, OverlayVertex};
use super::lod::{GlobeLod, GlobeMap};
use super::sphere_mesh::{GLOBE_RINGS, GLOBE_SEGMENTS, unit_quad, uv_sphere};
use super::texture_loader::{DecodedImage, TextureTarget};
use super::uniforms::{FrameUniforms, MeshVertex, PlaneUniforms};
use crate::error::{GlobeError, GlobeResult};
use crate::scene::NodeKind;
use crate::trips::TripId;

const SHADER_SOURCE: &str = include_str!("../../../shaders/globe.wgsl");

/// Ocean-blue stand-in until the colour map arrives
const FALLBACK_COLOR: [u8; 4] = [18, 42, 86, 255];
const FALLBACK_SPECULAR: [u8; 4] = [0, 0, 0, 255];

const INITIAL_LABEL_VERTICES: u64 = 4096;

struct MeshBuffer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffer {
    fn new(gpu: &GpuContext, label: &str, vertices: &[MeshVertex], indices: &[u32]) -> Self {
        Self {
            vertex_buffer: gpu.create_vertex_buffer(label, vertices),
            index_buffer: gpu.create_index_buffer(label, indices),
            index_count: indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count > 0 {
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }
}

struct PlaneGpu {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct OverlayBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: u64,
}

pub struct GlobeRenderer {
    gpu: GpuContext,
    start_time: Instant,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    material_layout: wgpu::BindGroupLayout,
    plane_layout: wgpu::BindGroupLayout,

    sky_pipeline: wgpu::RenderPipeline,
    globe_pipeline: wgpu::RenderPipeline,
    plane_pipeline: wgpu::RenderPipeline,
    label_pipeline: wgpu::RenderPipeline,

    sphere: MeshBuffer,
    quad: MeshBuffer,
    overlay: OverlayBuffers,

    globe_maps: HashMap<GlobeMap, wgpu::TextureView>,
    fallback_color: wgpu::TextureView,
    fallback_specular: wgpu::TextureView,
    material_bind_group: wgpu::BindGroup,
    /// Colour map the material bind group was built with, `None` when stale
    material_lod: Option<GlobeLod>,

    planes: HashMap<(TripId, usize), PlaneGpu>,
    pending_frame: Option<wgpu::SurfaceTexture>,
}

impl GlobeRenderer {
    pub fn new(window: Arc<Window>, config: &GpuContextConfig) -> GlobeResult<Self> {
        let gpu = GpuContext::new(window, config)?;
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Globe Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let frame_buffer = gpu.create_uniform_buffer("Frame Uniforms", &FrameUniforms::default());

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globe Material Layout"),
            entries: &[texture_entry(0), texture_entry(1), sampler_entry(2)],
        });
        let plane_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Photo Plane Layout"),
            entries: &[uniform_entry(0), texture_entry(1), sampler_entry(2)],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Globe Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });
        let globe_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Globe Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });
        // group 1 stays bound to the globe material while planes draw
        let plane_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Plane Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout, &plane_layout],
            push_constant_ranges: &[],
        });
        let label_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Label Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let format = gpu.format();
        let sky_pipeline = scene_pipeline(
            device,
            "Sky Pipeline",
            &sky_layout,
            &shader,
            ("vs_sky", "fs_sky"),
            &[],
            format,
            None,
            false,
        );
        let globe_pipeline = scene_pipeline(
            device,
            "Globe Pipeline",
            &globe_layout,
            &shader,
            ("vs_globe", "fs_globe"),
            &[MeshVertex::layout()],
            format,
            Some(wgpu::Face::Back),
            true,
        );
        let plane_pipeline = scene_pipeline(
            device,
            "Plane Pipeline",
            &plane_pipeline_layout,
            &shader,
            ("vs_plane", "fs_plane"),
            &[MeshVertex::layout()],
            format,
            None,
            true,
        );
        let label_pipeline = overlay_pipeline(device, &label_layout, &shader, format);

        let (sphere_vertices, sphere_indices) = uv_sphere(GLOBE_SEGMENTS, GLOBE_RINGS);
        let sphere = MeshBuffer::new(&gpu, "Globe Mesh", &sphere_vertices, &sphere_indices);
        let (quad_vertices, quad_indices) = unit_quad();
        let quad = MeshBuffer::new(&gpu, "Photo Quad", &quad_vertices, &quad_indices);
        let overlay = OverlayBuffers::new(&gpu, INITIAL_LABEL_VERTICES);

        let fallback_color = gpu.create_rgba_texture("Fallback Globe Color", 1, 1, &FALLBACK_COLOR);
        let fallback_specular =
            gpu.create_rgba_texture("Fallback Globe Specular", 1, 1, &FALLBACK_SPECULAR);
        let material_bind_group = material_bind_group(
            device,
            &material_layout,
            &fallback_color,
            &fallback_specular,
            &sampler,
        );

        debug!(format = ?format, "globe renderer ready");

        Ok(Self {
            gpu,
            start_time: Instant::now(),
            frame_buffer,
            frame_bind_group,
            sampler,
            material_layout,
            plane_layout,
            sky_pipeline,
            globe_pipeline,
            plane_pipeline,
            label_pipeline,
            sphere,
            quad,
            overlay,
            globe_maps: HashMap::new(),
            fallback_color,
            fallback_specular,
            material_bind_group,
            material_lod: None,
            planes: HashMap::new(),
            pending_frame: None,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Largest texture edge this device accepts.
    pub fn max_texture_size(&self) -> u32 {
        self.gpu.max_texture_size
    }

    fn refresh_material(&mut self, lod: GlobeLod) {
        if self.material_lod == Some(lod) {
            return;
        }
        let color = self
            .globe_maps
            .get(&GlobeMap::Color(lod))
            .or_else(|| self.globe_maps.get(&GlobeMap::Color(GlobeLod::Standard)))
            .unwrap_or(&self.fallback_color);
        let specular = self
            .globe_maps
            .get(&GlobeMap::Specular)
            .unwrap_or(&self.fallback_specular);
        self.material_bind_group = material_bind_group(
            &self.gpu.device,
            &self.material_layout,
            color,
            specular,
            &self.sampler,
        );
        self.material_lod = Some(lod);
        debug!(?lod, "globe material rebuilt");
    }

    fn acquire_frame(&mut self) -> GlobeResult<Option<wgpu::SurfaceTexture>> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout, frame skipped");
                Ok(None)
            }
            Err(e) => Err(GlobeError::Frame(e)),
        }
    }
}

impl FrameSink for GlobeRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn upload(&mut self, image: &DecodedImage) {
        if image.width > self.gpu.max_texture_size || image.height > self.gpu.max_texture_size {
            warn!(
                texture = ?image.target,
                width = image.width,
                height = image.height,
                "image exceeds GPU texture limit, skipped"
            );
            return;
        }

        match image.target {
            TextureTarget::Globe(map) => {
                let view =
                    self.gpu
                        .create_rgba_texture("Globe Map", image.width, image.height, &image.rgba);
                self.globe_maps.insert(map, view);
                self.material_lod = None;
            }
            TextureTarget::Plane { folder, index } => {
                let view =
                    self.gpu
                        .create_rgba_texture("Photo", image.width, image.height, &image.rgba);
                let uniform_buffer = self.gpu.create_uniform_buffer(
                    "Photo Plane Uniforms",
                    &PlaneUniforms::new(glam::DMat4::IDENTITY, 1.0, 1.0),
                );
                let bind_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Photo Plane Bind Group"),
                    layout: &self.plane_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });
                self.planes.insert(
                    (folder, index),
                    PlaneGpu {
                        uniform_buffer,
                        bind_group,
                    },
                );
            }
        }
    }

    fn draw_scene(&mut self, view: &FrameView<'_>) -> GlobeResult<()> {
        // an unpresented frame from a skipped overlay goes out first
        if let Some(stale) = self.pending_frame.take() {
            stale.present();
        }
        let Some(frame) = self.acquire_frame()? else {
            return Ok(());
        };

        self.refresh_material(view.lod);

        let graph = view.scene.graph();
        let time = self.start_time.elapsed().as_secs_f32();
        let uniforms = FrameUniforms::new(
            view.camera,
            graph.root_rotation(),
            time,
            self.globe_maps.contains_key(&GlobeMap::Specular),
        );
        self.gpu.write_buffer(&self.frame_buffer, &[uniforms]);

        let mut visible_planes = Vec::new();
        for node in graph.pickable() {
            let NodeKind::ImagePlane { index, width, height } = node.kind else {
                continue;
            };
            let Some(folder) = node.folder else {
                continue;
            };
            let Some(plane) = self.planes.get(&(folder, index)) else {
                continue;
            };
            let transform = graph.root_rotation() * node.globe_space;
            self.gpu
                .write_buffer(&plane.uniform_buffer, &[PlaneUniforms::new(transform, width, height)]);
            visible_planes.push((folder, index));
        }

        let color_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Globe Scene Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            pass.set_pipeline(&self.sky_pipeline);
            pass.draw(0..3, 0..1);

            pass.set_pipeline(&self.globe_pipeline);
            pass.set_bind_group(1, &self.material_bind_group, &[]);
            self.sphere.draw(&mut pass);

            pass.set_pipeline(&self.plane_pipeline);
            for key in &visible_planes {
                if let Some(plane) = self.planes.get(key) {
                    pass.set_bind_group(2, &plane.bind_group, &[]);
                    self.quad.draw(&mut pass);
                }
            }
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.pending_frame = Some(frame);
        Ok(())
    }

    fn draw_labels(&mut self, labels: &LabelMesh) -> GlobeResult<()> {
        let Some(frame) = self.pending_frame.take() else {
            return Ok(());
        };

        if !labels.is_empty() {
            self.overlay
                .ensure_capacity(&self.gpu, labels.vertices.len() as u64);
            self.gpu
                .write_buffer(&self.overlay.vertex_buffer, &labels.vertices);
            self.gpu
                .write_buffer(&self.overlay.index_buffer, &labels.indices);

            let color_view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let mut encoder =
                self.gpu
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Label Overlay Encoder"),
                    });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Label Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_pipeline(&self.label_pipeline);
                pass.set_vertex_buffer(0, self.overlay.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    self.overlay.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..labels.indices.len() as u32, 0, 0..1);
            }
            self.gpu.queue.submit(std::iter::once(encoder.finish()));
        }

        frame.present();
        Ok(())
    }
}

impl OverlayBuffers {
    fn new(gpu: &GpuContext, vertex_capacity: u64) -> Self {
        let vertex_size = std::mem::size_of::<OverlayVertex>() as u64;
        // six indices per four vertices
        let index_capacity = vertex_capacity / 4 * 6;
        Self {
            vertex_buffer: gpu.create_dynamic_buffer(
                "Label Vertices",
                vertex_capacity * vertex_size,
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: gpu.create_dynamic_buffer(
                "Label Indices",
                index_capacity * std::mem::size_of::<u32>() as u64,
                wgpu::BufferUsages::INDEX,
            ),
            vertex_capacity,
        }
    }

    fn ensure_capacity(&mut self, gpu: &GpuContext, vertices: u64) {
        if vertices <= self.vertex_capacity {
            return;
        }
        let capacity = vertices.next_power_of_two();
        debug!(capacity, "growing label buffers");
        *self = Self::new(gpu, capacity);
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    color: &wgpu::TextureView,
    specular: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Globe Material Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(color),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(specular),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[allow(clippy::too_many_arguments)]
fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vs_entry, fs_entry): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: if depth_write {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn overlay_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Label Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_label"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<OverlayVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_label"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

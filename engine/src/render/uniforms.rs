//! Uniform Structs for GPU Shaders
//!
//! GPU-compatible uniform buffer structures for `shaders/globe.wgsl`.
//! They must match the WGSL layout exactly.

use glam::{DMat4, Mat4, Vec3};

use crate::camera::GlobeCamera;

/// Light coming from (5, 5, 5), as in a sun above and to the right.
pub const SUN_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);
pub const AMBIENT_INTENSITY: f32 = 0.1;
pub const SUN_INTENSITY: f32 = 0.6;
/// Strength of the ocean highlight where the specular map is bright
pub const SPECULAR_INTENSITY: f32 = 0.33;

/// Per-frame uniforms shared by every pipeline.
///
/// WGSL layout (240 bytes):
///   offset   0: view_proj (mat4x4<f32>)      = 64 bytes
///   offset  64: inv_view_proj (mat4x4<f32>)  = 64 bytes
///   offset 128: globe_model (mat4x4<f32>)    = 64 bytes
///   offset 192: camera_pos (vec3<f32>)       = 12 bytes
///   offset 204: time (f32)                   = 4 bytes
///   offset 208: sun_dir (vec3<f32>)          = 12 bytes
///   offset 220: ambient (f32)                = 4 bytes
///   offset 224: sun_strength (f32)           = 4 bytes
///   offset 228: specular_strength (f32)      = 4 bytes
///   offset 232: has_specular (u32)           = 4 bytes
///   offset 236: _pad (u32)                   = 4 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub globe_model: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    /// Seconds since the renderer started, for star twinkle
    pub time: f32,
    /// Normalized direction toward the sun
    pub sun_dir: [f32; 3],
    pub ambient: f32,
    pub sun_strength: f32,
    pub specular_strength: f32,
    /// 1 once the specular map is loaded
    pub has_specular: u32,
    pub _pad: u32,
}

static_assertions::assert_eq_size!(FrameUniforms, [u8; 240]);

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            inv_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            globe_model: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 3.0],
            time: 0.0,
            sun_dir: SUN_POSITION.normalize().to_array(),
            ambient: AMBIENT_INTENSITY,
            sun_strength: SUN_INTENSITY,
            specular_strength: SPECULAR_INTENSITY,
            has_specular: 0,
            _pad: 0,
        }
    }
}

impl FrameUniforms {
    pub fn new(camera: &GlobeCamera, globe_rotation: DMat4, time: f32, has_specular: bool) -> Self {
        let view_proj = camera.view_projection_matrix().as_mat4();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            globe_model: globe_rotation.as_mat4().to_cols_array_2d(),
            camera_pos: camera.eye().as_vec3().to_array(),
            time,
            has_specular: u32::from(has_specular),
            ..Default::default()
        }
    }
}

/// Per-plane uniforms for a photo.
///
/// WGSL layout (80 bytes):
///   offset  0: model (mat4x4<f32>)  = 64 bytes, includes the plane size as scale
///   offset 64: tint (vec4<f32>)     = 16 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneUniforms {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

static_assertions::assert_eq_size!(PlaneUniforms, [u8; 80]);

impl PlaneUniforms {
    /// `transform` places a unit quad; `width`/`height` stretch it.
    pub fn new(transform: DMat4, width: f64, height: f64) -> Self {
        let model = transform * DMat4::from_scale(glam::DVec3::new(width, height, 1.0));
        Self {
            model: model.as_mat4().to_cols_array_2d(),
            tint: [1.0; 4],
        }
    }
}

/// Vertex for the globe sphere and photo quads.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(MeshVertex, [u8; 32]);

impl MeshVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

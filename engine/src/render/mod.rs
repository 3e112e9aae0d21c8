//! Render Module
//!
//! Frame scheduling, label overlay, texture streaming and the wgpu globe
//! renderer. Everything above `globe_renderer` is GPU-free and runs in tests.

pub mod font;
pub mod frame_sink;
pub mod globe_renderer;
pub mod gpu_context;
pub mod label_layer;
pub mod lod;
pub mod render_loop;
pub mod sphere_mesh;
pub mod texture_loader;
pub mod uniforms;

pub use frame_sink::{FrameSink, FrameView, NullFrameSink};
pub use globe_renderer::GlobeRenderer;
pub use gpu_context::{DEPTH_FORMAT, GpuContext, GpuContextConfig};
pub use label_layer::{LabelLayer, LabelMesh, LabelPlacement, OverlayVertex};
pub use lod::{GlobeLod, GlobeMap, select_lod};
pub use render_loop::{FrameClock, FrameStages, MAX_FRAME_SECONDS, RenderLoop, TickStatus};
pub use sphere_mesh::{GLOBE_RINGS, GLOBE_SEGMENTS, unit_quad, uv_sphere};
pub use texture_loader::{DecodedImage, LoaderEvent, TextureLoader, TextureTarget, decode_image};
pub use uniforms::{FrameUniforms, MeshVertex, PlaneUniforms};

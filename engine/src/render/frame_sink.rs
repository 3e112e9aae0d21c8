//! Frame Sink
//!
//! Where the viewport sends its frames. The wgpu renderer is the real
//! sink; `NullFrameSink` stands in when nothing should reach a screen.

use super::label_layer::LabelMesh;
use super::lod::GlobeLod;
use super::texture_loader::DecodedImage;
use crate::camera::GlobeCamera;
use crate::error::GlobeResult;
use crate::scene::GlobeScene;

/// Everything the scene draw needs for one frame.
pub struct FrameView<'a> {
    pub camera: &'a GlobeCamera,
    pub scene: &'a GlobeScene,
    pub lod: GlobeLod,
}

pub trait FrameSink {
    /// Surface size changed.
    fn resize(&mut self, width: u32, height: u32);

    /// A decoded image is ready for the GPU.
    fn upload(&mut self, image: &DecodedImage);

    /// Draw the backdrop, globe and photos.
    fn draw_scene(&mut self, view: &FrameView<'_>) -> GlobeResult<()>;

    /// Draw the label overlay on top of the scene and finish the frame.
    fn draw_labels(&mut self, labels: &LabelMesh) -> GlobeResult<()>;
}

/// Accepts frames and discards them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn upload(&mut self, _image: &DecodedImage) {}

    fn draw_scene(&mut self, _view: &FrameView<'_>) -> GlobeResult<()> {
        Ok(())
    }

    fn draw_labels(&mut self, _labels: &LabelMesh) -> GlobeResult<()> {
        Ok(())
    }
}

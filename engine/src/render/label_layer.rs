//! Label Layer
//!
//! Screen-space tags under each folder: the trip location over its date on
//! a translucent dark box. Positions are recomputed every frame from the
//! same camera that drew the scene. A label shows only while its anchor is
//! inside the view volume and on the half of the globe facing the camera.

use tracing::trace;

use super::font::{layout_text, text_height, text_width};
use crate::camera::GlobeCamera;
use crate::scene::GlobeScene;
use crate::trips::{FolderLabel, TripId};

const TITLE_SCALE: f32 = 2.0;
const SUBTITLE_SCALE: f32 = 1.5;
const PADDING: f32 = 6.0;
const LINE_GAP: f32 = 4.0;

const BOX_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
const TITLE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const SUBTITLE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.7];

/// Where a folder's label lands this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub trip_id: TripId,
    /// Pixels from the left edge
    pub x: f64,
    /// Pixels from the top edge
    pub y: f64,
    /// Normalized depth of the anchor
    pub depth: f64,
    /// Box size in pixels, centred on `(x, y)`
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

impl LabelPlacement {
    /// Whether pixel `(x, y)` falls inside the drawn box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.visible
            && (x - self.x).abs() <= self.width * 0.5
            && (y - self.y).abs() <= self.height * 0.5
    }
}

/// Pixel size of the box drawn around `label`.
fn box_size(label: &FolderLabel) -> (f32, f32) {
    let inner_w = text_width(&label.title, TITLE_SCALE).max(text_width(&label.subtitle, SUBTITLE_SCALE));
    let inner_h = text_height(TITLE_SCALE) + LINE_GAP + text_height(SUBTITLE_SCALE);
    (inner_w + PADDING * 2.0, inner_h + PADDING * 2.0)
}

/// Vertex for the label overlay (NDC position, color)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Label geometry for one frame.
#[derive(Debug, Clone, Default)]
pub struct LabelMesh {
    pub vertices: Vec<OverlayVertex>,
    pub indices: Vec<u32>,
}

impl LabelMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4], screen: (f32, f32)) {
        let to_ndc = |px: f32, py: f32| [(px / screen.0) * 2.0 - 1.0, 1.0 - (py / screen.1) * 2.0];
        let base = self.vertices.len() as u32;
        for (px, py) in [(x, y), (x + w, y), (x + w, y + h), (x, y + h)] {
            self.vertices.push(OverlayVertex { position: to_ndc(px, py), color });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[derive(Debug, Clone)]
pub struct LabelLayer {
    width: u32,
    height: u32,
    placements: Vec<LabelPlacement>,
}

impl LabelLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            placements: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Project every folder label through `camera`.
    pub fn update(&mut self, scene: &GlobeScene, camera: &GlobeCamera) -> &[LabelPlacement] {
        let eye = camera.eye();
        self.placements.clear();
        for entry in scene.folders() {
            let Some(anchor) = scene.graph().world_position(entry.label) else {
                continue;
            };
            let facing = anchor.dot(eye - anchor) > 0.0;
            let (box_w, box_h) = box_size(&entry.folder.label);
            let placement = match camera.project(anchor) {
                Some(p) => LabelPlacement {
                    trip_id: entry.folder.id,
                    x: p.x,
                    y: p.y,
                    depth: p.depth,
                    width: box_w as f64,
                    height: box_h as f64,
                    visible: facing && p.in_view(self.width, self.height),
                },
                None => LabelPlacement {
                    trip_id: entry.folder.id,
                    x: f64::NAN,
                    y: f64::NAN,
                    depth: f64::INFINITY,
                    width: box_w as f64,
                    height: box_h as f64,
                    visible: false,
                },
            };
            self.placements.push(placement);
        }
        trace!(
            visible = self.placements.iter().filter(|p| p.visible).count(),
            "labels placed"
        );
        &self.placements
    }

    pub fn placements(&self) -> &[LabelPlacement] {
        &self.placements
    }

    pub fn placement(&self, trip_id: TripId) -> Option<&LabelPlacement> {
        self.placements.iter().find(|p| p.trip_id == trip_id)
    }

    /// Visible label drawn on top at pixel `(x, y)`, if any.
    ///
    /// Labels are drawn farthest first, so the nearest box containing the
    /// point is the one the user sees.
    pub fn hit(&self, x: f64, y: f64) -> Option<&LabelPlacement> {
        self.placements
            .iter()
            .filter(|p| p.contains(x, y))
            .min_by(|a, b| a.depth.total_cmp(&b.depth))
    }

    /// Overlay geometry for the visible labels, farthest first.
    pub fn build_mesh(&self, scene: &GlobeScene) -> LabelMesh {
        let screen = (self.width as f32, self.height as f32);
        let mut visible: Vec<&LabelPlacement> = self.placements.iter().filter(|p| p.visible).collect();
        visible.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let mut mesh = LabelMesh::default();
        for placement in visible {
            let Some(entry) = scene.folder(placement.trip_id) else {
                continue;
            };
            let title = entry.folder.label.title.as_str();
            let subtitle = entry.folder.label.subtitle.as_str();

            let box_w = placement.width as f32;
            let box_h = placement.height as f32;
            let left = placement.x as f32 - box_w * 0.5;
            let top = placement.y as f32 - box_h * 0.5;

            mesh.add_rect(left, top, box_w, box_h, BOX_COLOR, screen);

            let text_x = left + PADDING;
            let title_y = top + PADDING;
            for (px, py, size) in layout_text(title, text_x, title_y, TITLE_SCALE) {
                mesh.add_rect(px, py, size, size, TITLE_COLOR, screen);
            }
            let subtitle_y = title_y + text_height(TITLE_SCALE) + LINE_GAP;
            for (px, py, size) in layout_text(subtitle, text_x, subtitle_y, SUBTITLE_SCALE) {
                mesh.add_rect(px, py, size, size, SUBTITLE_COLOR, screen);
            }
        }
        mesh
    }
}

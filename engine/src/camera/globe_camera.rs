//! Globe Camera
//!
//! A perspective camera on the +Z axis looking at the globe centre. The
//! globe turns underneath it; the camera itself only moves in and out.

use glam::{DMat4, DVec2, DVec3, DVec4};

use super::raycast::{Ray, get_ray_direction};
use crate::config::GlobeConfig;
use crate::error::{GlobeError, GlobeResult};

/// A world point projected onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Pixels from the left edge
    pub x: f64,
    /// Pixels from the top edge
    pub y: f64,
    /// Normalized depth, 0 at the near plane and 1 at the far plane
    pub depth: f64,
}

impl ScreenPoint {
    /// Inside the view volume (on screen and between the clip planes).
    pub fn in_view(&self, width: u32, height: u32) -> bool {
        (0.0..=1.0).contains(&self.depth)
            && self.x >= 0.0
            && self.y >= 0.0
            && self.x <= width as f64
            && self.y <= height as f64
    }
}

#[derive(Debug, Clone)]
pub struct GlobeCamera {
    distance: f64,
    min_zoom: f64,
    max_zoom: f64,
    zoom_sensitivity: f64,
    /// Vertical field of view in degrees
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    width: u32,
    height: u32,
}

impl GlobeCamera {
    /// Create a camera for a viewport of `width` x `height` pixels.
    ///
    /// A zero-sized viewport has no valid projection and is rejected.
    pub fn new(config: &GlobeConfig, width: u32, height: u32) -> GlobeResult<Self> {
        if width == 0 || height == 0 {
            return Err(GlobeError::ZeroSizedViewport { width, height });
        }
        Ok(Self {
            distance: config
                .initial_distance
                .clamp(config.min_zoom, config.max_zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_sensitivity: config.zoom_sensitivity,
            fov: config.fov_degrees,
            near: config.near,
            far: config.far,
            width,
            height,
        })
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Move the camera along the view axis by a wheel delta (pixels,
    /// positive = away from the globe). The distance stays within the
    /// zoom range.
    pub fn zoom(&mut self, delta_scroll: f64) {
        let next = self.distance + delta_scroll * self.zoom_sensitivity;
        self.distance = next.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Update the viewport size. Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn eye(&self) -> DVec3 {
        DVec3::new(0.0, 0.0, self.distance)
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye(), DVec3::ZERO, DVec3::Y)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov.to_radians(), self.aspect(), self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Pixel position to normalized device coordinates (y up).
    pub fn to_ndc(&self, x: f64, y: f64) -> DVec2 {
        DVec2::new(
            (x / self.width as f64) * 2.0 - 1.0,
            1.0 - (y / self.height as f64) * 2.0,
        )
    }

    /// World-space ray from the eye through a pixel.
    pub fn ray_through(&self, x: f64, y: f64) -> Ray {
        let direction = get_ray_direction(
            self.eye(),
            DVec3::ZERO,
            self.to_ndc(x, y),
            self.aspect(),
            self.fov.to_radians(),
        );
        Ray::new(self.eye(), direction)
    }

    /// Project a world point to pixels. `None` when it is behind the eye.
    pub fn project(&self, world: DVec3) -> Option<ScreenPoint> {
        let clip = self.view_projection_matrix() * DVec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(ScreenPoint {
            x: (ndc.x + 1.0) * 0.5 * self.width as f64,
            y: (1.0 - ndc.y) * 0.5 * self.height as f64,
            depth: ndc.z,
        })
    }
}

//! Camera Module
//!
//! The globe camera, its orbit physics and the ray math used for picking.
//! This module is window-system agnostic - it only deals with camera state and math.

pub mod globe_camera;
pub mod orbit;
pub mod raycast;

pub use globe_camera::{GlobeCamera, ScreenPoint};
pub use orbit::{
    AngularVelocity, ArrivalCallback, FocusTarget, InteractionMode, OrbitPhysics, OrbitTick,
};
pub use raycast::{Ray, get_ray_direction, intersect_rect, intersect_sphere};

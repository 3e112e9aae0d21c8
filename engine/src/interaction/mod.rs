//! Interaction Module
//!
//! Pointer hit testing and the click/drag rules built on top of it.

pub mod focus;
pub mod overlay;
pub mod picking;

pub use focus::{FocusStateMachine, GlobeEvent};
pub use overlay::{NoOverlay, OverlayProbe};
pub use picking::{GLOBE_RADIUS, PickResult, pick, pick_surface};

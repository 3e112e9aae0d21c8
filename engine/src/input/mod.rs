//! Input Module
//!
//! Provides platform-agnostic pointer handling.
//! This module is decoupled from any specific windowing system (like winit)
//! to allow for flexible integration.
//!
//! # Example
//!
//! ```rust,ignore
//! use trip_globe_engine::input::{DragTracker, Position};
//!
//! let mut drag = DragTracker::new();
//! drag.press(Position::new(100.0, 50.0), Instant::now());
//! if let Some(sample) = drag.move_to(Position::new(110.0, 50.0), Instant::now()) {
//!     // rotate by sample.dx, sample.dy
//! }
//! ```

pub mod mouse;
pub mod pointer;

pub use mouse::{MouseButton, PIXELS_PER_LINE, Position, ScrollDelta};
pub use pointer::{DragRelease, DragSample, DragTracker};

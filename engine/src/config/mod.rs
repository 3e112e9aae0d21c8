//! Config Module
//!
//! Centralized configuration for globe interaction and the desktop viewer.

pub mod globe_config;
pub mod viewer_config;

pub use globe_config::GlobeConfig;
pub use viewer_config::ViewerConfig;

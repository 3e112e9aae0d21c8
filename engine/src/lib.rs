//! Trip Globe Engine
//!
//! An interactive 3D globe for browsing trip photo folders. Each trip sits
//! on the globe at its coordinates as a small stack of photos with a label;
//! the globe can be dragged, flung, zoomed and re-centred on a folder.
//!
//! # Modules
//!
//! - [`world`] - Spherical coordinates and the globe orientation
//! - [`camera`] - Globe camera, orbit physics and ray casting
//! - [`scene`] - Scene graph of folders, photo planes and labels
//! - [`interaction`] - Picking and the focus state machine
//! - [`input`] - Pointer and wheel input
//! - [`render`] - Render loop, label overlay, textures and the wgpu renderer
//! - [`trips`] - Trip records and label text
//! - [`config`] - Globe constants and viewer settings
//! - [`viewport`] - The globe widget tying it all together
//!
//! # Example
//!
//! ```ignore
//! use trip_globe_engine::{GlobeConfig, GlobeViewport, JsonTripSource, NullFrameSink, TripCollection};
//!
//! let trips = TripCollection::load(&JsonTripSource::new("assets/images/photos/trips.json"))?;
//! let mut viewport = GlobeViewport::new(
//!     GlobeConfig::default(),
//!     1280,
//!     720,
//!     &trips,
//!     Box::new(NullFrameSink),
//!     std::time::Instant::now(),
//! )?;
//! viewport.frame(std::time::Instant::now())?;
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod trips;
pub mod viewport;
pub mod world;

pub use camera::{GlobeCamera, InteractionMode, OrbitPhysics};
pub use config::{GlobeConfig, ViewerConfig};
pub use error::{GlobeError, GlobeResult};
pub use input::{MouseButton, Position, ScrollDelta};
pub use interaction::{GlobeEvent, OverlayProbe, PickResult};
pub use render::{FrameSink, GlobeRenderer, NullFrameSink, TextureLoader, TickStatus};
pub use scene::GlobeScene;
pub use trips::{JsonTripSource, Trip, TripCollection, TripId, TripSource};
pub use viewport::GlobeViewport;
pub use world::{GeoCoord, Orientation};

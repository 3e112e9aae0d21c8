//! World Module
//!
//! Geographic coordinate math for the unit globe.

pub mod spherical;

pub use spherical::{
    GeoCoord, LATITUDE_LIMIT, Orientation, clamp_latitude, from_surface_point,
    normalize_longitude, to_surface_point,
};

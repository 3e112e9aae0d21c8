//! Spherical Coordinates
//!
//! Conversions between geographic coordinates (degrees) and points on the
//! unit globe, plus the wrapping/clamping rules every orientation obeys.
//!
//! Globe-local frame:
//! - (lat 0, lon 0) sits on +Z
//! - longitude grows eastward toward +X
//! - latitude grows northward toward +Y

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Latitude limit in degrees, keeps the view away from the poles.
pub const LATITUDE_LIMIT: f64 = 85.0;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoord {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Wrap a longitude into (-180, 180].
pub fn normalize_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return 0.0;
    }
    if lon > -180.0 && lon <= 180.0 {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Clamp a latitude into [-LATITUDE_LIMIT, LATITUDE_LIMIT].
pub fn clamp_latitude(lat: f64) -> f64 {
    if lat.is_nan() {
        return 0.0;
    }
    lat.clamp(-LATITUDE_LIMIT, LATITUDE_LIMIT)
}

/// Unit-sphere point for a geographic coordinate.
pub fn to_surface_point(lat: f64, lon: f64) -> DVec3 {
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    DVec3::new(cos_lat * sin_lon, sin_lat, cos_lat * cos_lon)
}

/// Geographic coordinate of a point on (or near) the unit sphere.
///
/// The point is normalised first so ray hits that land a hair off the
/// surface still resolve. Returns `(lat, lon)` in degrees.
pub fn from_surface_point(point: DVec3) -> (f64, f64) {
    let p = point.normalize_or_zero();
    let lat = p.y.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.x.atan2(p.z).to_degrees();
    (lat, lon)
}

/// The globe orientation: which geographic point faces the camera.
///
/// Fields are private so every update goes through clamping and wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    latitude: f64,
    longitude: f64,
}

impl Orientation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: clamp_latitude(latitude),
            longitude: normalize_longitude(longitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn set(&mut self, latitude: f64, longitude: f64) {
        *self = Self::new(latitude, longitude);
    }

    pub fn offset(&mut self, d_lat: f64, d_lon: f64) {
        self.set(self.latitude + d_lat, self.longitude + d_lon);
    }

    pub fn as_coord(&self) -> GeoCoord {
        GeoCoord::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_positive_z() {
        let p = to_surface_point(0.0, 0.0);
        assert!((p - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_east_is_positive_x() {
        let p = to_surface_point(0.0, 90.0);
        assert!((p - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_north_is_positive_y() {
        let p = to_surface_point(90.0, 0.0);
        assert!((p - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_surface_points_are_unit_length() {
        for lat in [-85.0, -30.0, 0.0, 12.5, 85.0] {
            for lon in [-179.0, -90.0, 0.0, 45.0, 180.0] {
                let len = to_surface_point(lat, lon).length();
                assert!((len - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-180.0), 180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(720.0), 0.0);
        assert_eq!(normalize_longitude(f64::NAN), 0.0);
    }

    #[test]
    fn test_clamp_latitude() {
        assert_eq!(clamp_latitude(90.0), 85.0);
        assert_eq!(clamp_latitude(-123.0), -85.0);
        assert_eq!(clamp_latitude(42.0), 42.0);
    }

    #[test]
    fn test_from_surface_point_tolerates_off_sphere_points() {
        let (lat, lon) = from_surface_point(DVec3::new(0.0, 0.0, 1.0000001));
        assert!(lat.abs() < 1e-9);
        assert!(lon.abs() < 1e-9);
    }

    #[test]
    fn test_orientation_wraps_on_offset() {
        let mut o = Orientation::new(80.0, 175.0);
        o.offset(10.0, 10.0);
        assert_eq!(o.latitude(), 85.0);
        assert!((o.longitude() - -175.0).abs() < 1e-9);
    }
}

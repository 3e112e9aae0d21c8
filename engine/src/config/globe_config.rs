//! Globe Configuration
//!
//! Every tuning constant of the globe interaction in one place. The values
//! are fixed for the shipped viewer; tests build variants with struct update
//! syntax.

/// Interaction, layout and camera constants for the globe.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeConfig {
    // Folder layout
    /// Width of a photo plane in globe units
    pub folder_size: f64,
    /// Depth step between stacked photos
    pub photo_spacing: f64,
    /// Sideways step between stacked photos (x right, y down)
    pub photo_stagger: f64,
    /// Radius at which folders float above the unit globe
    pub folder_altitude: f64,
    /// Label offset below the folder, as a fraction of `folder_size`
    pub label_drop: f64,

    // Camera
    /// Closest camera distance from the globe centre
    pub min_zoom: f64,
    /// Farthest camera distance from the globe centre
    pub max_zoom: f64,
    /// Starting camera distance
    pub initial_distance: f64,
    /// Distance change per wheel pixel
    pub zoom_sensitivity: f64,
    /// Vertical field of view in degrees
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,

    // Orbit
    /// Degrees of rotation per pointer pixel
    pub rotate_sensitivity: f64,
    /// Per-tick velocity multiplier while free-spinning
    pub damping: f64,
    /// Per-tick fraction of the remaining distance covered while converging
    pub lerp_speed: f64,
    /// Convergence ends once both axes are this close (degrees)
    pub arrival_threshold: f64,
    /// A folder counts as centred within this many degrees on each axis
    pub centering_threshold: f64,
    /// Free spin stops once both speeds fall below this (degrees/second)
    pub rest_speed: f64,
    /// Upper bound on release speed (degrees/second)
    pub max_spin_speed: f64,
    /// A release this long after the last pointer movement does not spin (seconds)
    pub release_window: f64,

    // Level of detail
    /// Camera distance below which the detailed globe map is used
    pub lod_switch_distance: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            folder_size: 0.25,
            photo_spacing: 0.02,
            photo_stagger: 0.01,
            folder_altitude: 1.05,
            label_drop: 0.6,

            min_zoom: 1.01,
            max_zoom: 4.0,
            initial_distance: 3.0,
            zoom_sensitivity: 0.0005,
            fov_degrees: 45.0,
            near: 0.001,
            far: 100.0,

            rotate_sensitivity: 0.2,
            damping: 0.99,
            lerp_speed: 0.1,
            arrival_threshold: 0.1,
            centering_threshold: 5.0,
            rest_speed: 1e-3,
            max_spin_speed: 720.0,
            release_window: 0.1,

            lod_switch_distance: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer_constants() {
        let c = GlobeConfig::default();
        assert_eq!(c.folder_size, 0.25);
        assert_eq!(c.photo_spacing, 0.02);
        assert_eq!(c.min_zoom, 1.01);
        assert_eq!(c.max_zoom, 4.0);
        assert_eq!(c.zoom_sensitivity, 0.0005);
        assert_eq!(c.rotate_sensitivity, 0.2);
        assert_eq!(c.damping, 0.99);
        assert_eq!(c.lerp_speed, 0.1);
        assert_eq!(c.arrival_threshold, 0.1);
        assert_eq!(c.centering_threshold, 5.0);
    }

    #[test]
    fn test_initial_distance_within_zoom_range() {
        let c = GlobeConfig::default();
        assert!(c.initial_distance >= c.min_zoom && c.initial_distance <= c.max_zoom);
    }
}

//! Hit Testing
//!
//! Reports what sits under the pointer: a folder (its label or a photo
//! plane), the bare globe, or nothing. Labels are drawn over the scene in
//! screen space, so they are tested first, in pixels, against the boxes
//! the label layer laid out. Everything else is found by casting the
//! pointer ray into the scene.

use glam::DVec3;

use crate::camera::{GlobeCamera, Ray, intersect_rect, intersect_sphere};
use crate::render::LabelLayer;
use crate::scene::{GlobeScene, orientation_rotation};
use crate::trips::TripId;
use crate::world::{GeoCoord, Orientation, from_surface_point};

/// Radius of the globe sphere.
pub const GLOBE_RADIUS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickResult {
    Folder { trip_id: TripId, distance: f64 },
    Globe { coord: GeoCoord, distance: f64 },
    Miss,
}

impl PickResult {
    pub fn distance(&self) -> Option<f64> {
        match *self {
            PickResult::Folder { distance, .. } | PickResult::Globe { distance, .. } => {
                Some(distance)
            }
            PickResult::Miss => None,
        }
    }

    pub fn trip_id(&self) -> Option<TripId> {
        match *self {
            PickResult::Folder { trip_id, .. } => Some(trip_id),
            _ => None,
        }
    }

    /// Keep whichever of the two hits is nearer.
    fn nearest(self, other: PickResult) -> PickResult {
        match (self.distance(), other.distance()) {
            (_, None) => self,
            (None, Some(_)) => other,
            (Some(a), Some(b)) if b < a => other,
            _ => self,
        }
    }
}

/// Geographic coordinate under a world-space point, given the globe orientation.
fn world_to_geo(point: DVec3, orientation: Orientation) -> GeoCoord {
    let globe_local = orientation_rotation(orientation)
        .inverse()
        .transform_vector3(point);
    let (lat, lon) = from_surface_point(globe_local);
    GeoCoord::new(lat, lon)
}

fn hit_globe(ray: &Ray, orientation: Orientation) -> PickResult {
    match intersect_sphere(ray, DVec3::ZERO, GLOBE_RADIUS) {
        Some(distance) => PickResult::Globe {
            coord: world_to_geo(ray.at(distance), orientation),
            distance,
        },
        None => PickResult::Miss,
    }
}

/// Nearest hit under the pointer at pixel `(x, y)`.
///
/// A visible label box under the pointer wins with distance zero. Otherwise
/// only photo planes attached to `scene` and the globe take part. Each hit
/// node names its folder directly, so no parent walk is needed.
pub fn pick(
    x: f64,
    y: f64,
    camera: &GlobeCamera,
    scene: &GlobeScene,
    labels: &LabelLayer,
    orientation: Orientation,
) -> PickResult {
    if let Some(label) = labels.hit(x, y) {
        return PickResult::Folder {
            trip_id: label.trip_id,
            distance: 0.0,
        };
    }

    let ray = camera.ray_through(x, y);
    let root = orientation_rotation(orientation);

    let mut best = hit_globe(&ray, orientation);
    for node in scene.graph().pickable() {
        let (Some(trip_id), Some((half_w, half_h))) = (node.folder, node.kind.pick_extents())
        else {
            continue;
        };
        let transform = root * node.globe_space;
        if let Some(distance) = intersect_rect(&ray, &transform, half_w, half_h) {
            best = best.nearest(PickResult::Folder { trip_id, distance });
        }
    }
    best
}

/// Globe coordinate under the pointer, ignoring folders.
pub fn pick_surface(
    x: f64,
    y: f64,
    camera: &GlobeCamera,
    orientation: Orientation,
) -> Option<GeoCoord> {
    let ray = camera.ray_through(x, y);
    match hit_globe(&ray, orientation) {
        PickResult::Globe { coord, .. } => Some(coord),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobeConfig;
    use crate::trips::{Coordinates, EnglishDates, Trip, TripCollection};

    fn camera() -> GlobeCamera {
        GlobeCamera::new(&GlobeConfig::default(), 800, 600).unwrap()
    }

    fn no_labels() -> LabelLayer {
        LabelLayer::new(800, 600)
    }

    fn scene_with(trips: &[(u32, f64, f64)]) -> GlobeScene {
        let trips = trips
            .iter()
            .map(|&(id, lat, lon)| Trip {
                id: TripId(id),
                date: "2021-03-04".into(),
                location: "Somewhere".into(),
                coords: Coordinates { lat, lon },
                preview_images: vec!["p.jpg".into()],
                images: Vec::new(),
            })
            .collect();
        GlobeScene::build(&TripCollection::new(trips), &GlobeConfig::default(), &EnglishDates)
    }

    #[test]
    fn test_centre_hits_globe_at_orientation() {
        let scene = GlobeScene::empty(&GlobeConfig::default());
        let hit = pick(400.0, 300.0, &camera(), &scene, &no_labels(), Orientation::new(0.0, 0.0));
        match hit {
            PickResult::Globe { coord, distance } => {
                assert!(coord.lat.abs() < 1e-9);
                assert!(coord.lon.abs() < 1e-9);
                assert!((distance - 2.0).abs() < 1e-9);
            }
            other => panic!("expected globe hit, got {other:?}"),
        }
    }

    #[test]
    fn test_surface_coordinates_follow_orientation() {
        let coord = pick_surface(400.0, 300.0, &camera(), Orientation::new(30.0, -60.0)).unwrap();
        assert!((coord.lat - 30.0).abs() < 1e-6);
        assert!((coord.lon - -60.0).abs() < 1e-6);
    }

    #[test]
    fn test_corner_misses() {
        let scene = GlobeScene::empty(&GlobeConfig::default());
        assert_eq!(
            pick(0.0, 0.0, &camera(), &scene, &no_labels(), Orientation::default()),
            PickResult::Miss
        );
        assert!(pick_surface(0.0, 0.0, &camera(), Orientation::default()).is_none());
    }

    #[test]
    fn test_label_box_counts_as_its_folder() {
        let mut scene = scene_with(&[(1, 0.0, 0.0)]);
        let orientation = Orientation::new(0.0, 0.0);
        scene.apply_orientation(orientation);
        let cam = camera();
        let mut labels = no_labels();
        labels.update(&scene, &cam);

        let p = *labels.placement(TripId(1)).unwrap();
        let edge_x = p.x + p.width * 0.5 - 1.0;
        match pick(edge_x, p.y, &cam, &scene, &labels, orientation) {
            PickResult::Folder { trip_id, .. } => assert_eq!(trip_id, TripId(1)),
            other => panic!("expected folder hit, got {other:?}"),
        }
        let outside = pick(p.x, p.y + p.height * 0.5 + 1.0, &cam, &scene, &labels, orientation);
        assert!(matches!(outside, PickResult::Globe { .. }));
    }

    #[test]
    fn test_label_without_layout_is_not_hit() {
        let scene = scene_with(&[(1, 0.0, 0.0)]);
        let cam = camera();
        let label = scene.label_position(TripId(1)).unwrap();
        let p = cam.project(label).unwrap();
        let hit = pick(p.x, p.y, &cam, &scene, &no_labels(), Orientation::new(0.0, 0.0));
        assert!(matches!(hit, PickResult::Globe { .. }));
    }

    #[test]
    fn test_plane_hit_reports_folder() {
        let mut scene = scene_with(&[(1, 0.0, 0.0), (2, 0.0, 90.0)]);
        scene.attach_image_plane(TripId(1), 0, 300, 200);
        let hit = pick(400.0, 300.0, &camera(), &scene, &no_labels(), Orientation::new(0.0, 0.0));
        assert_eq!(hit.trip_id(), Some(TripId(1)));
        assert!((hit.distance().unwrap() - (3.0 - 1.05)).abs() < 1e-9);
    }

    #[test]
    fn test_folder_behind_globe_is_occluded() {
        let mut scene = scene_with(&[(1, 0.0, 180.0)]);
        scene.attach_image_plane(TripId(1), 0, 300, 200);
        let hit = pick(400.0, 300.0, &camera(), &scene, &no_labels(), Orientation::new(0.0, 0.0));
        assert!(matches!(hit, PickResult::Globe { .. }));
    }

    #[test]
    fn test_planes_not_yet_attached_are_not_hit() {
        let scene = scene_with(&[(1, 0.0, 0.0)]);
        let hit = pick(400.0, 300.0, &camera(), &scene, &no_labels(), Orientation::new(0.0, 0.0));
        assert!(matches!(hit, PickResult::Globe { .. }));
    }
}

//! Raycast Module
//!
//! Rays through screen points and their intersections with the globe sphere
//! and with the rectangular photo planes.

use glam::{DMat4, DVec2, DVec3};

/// Hits closer than this along the ray are ignored.
const MIN_HIT_DISTANCE: f64 = 1e-6;

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Ray direction through a normalized device coordinate.
///
/// # Arguments
/// * `camera_pos` - Camera position in world space
/// * `camera_target` - Point the camera is looking at
/// * `ndc` - Normalized device coordinates, x right and y up, both in [-1, 1]
/// * `aspect_ratio` - Screen aspect ratio (width / height)
/// * `fov` - Vertical field of view in radians
pub fn get_ray_direction(
    camera_pos: DVec3,
    camera_target: DVec3,
    ndc: DVec2,
    aspect_ratio: f64,
    fov: f64,
) -> DVec3 {
    let half_fov = (fov * 0.5).tan();

    let forward = (camera_target - camera_pos).normalize();
    let up_world = DVec3::Y;

    // Handle edge case when looking straight up/down
    let (right, up) = if forward.y.abs() > 0.99 {
        let right = DVec3::X;
        let up = right.cross(forward).normalize();
        (right, up)
    } else {
        let right = forward.cross(up_world).normalize();
        let up = right.cross(forward);
        (right, up)
    };

    (right * ndc.x * aspect_ratio * half_fov + up * ndc.y * half_fov + forward).normalize()
}

/// Nearest positive distance at which `ray` meets a sphere.
///
/// When the origin is inside the sphere the exit point is returned.
pub fn intersect_sphere(ray: &Ray, sphere_center: DVec3, sphere_radius: f64) -> Option<f64> {
    // |oc + t*d|^2 = r^2 with |d| = 1:  t^2 + 2t(oc.d) + (oc.oc - r^2) = 0
    let oc = ray.origin - sphere_center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - sphere_radius * sphere_radius;

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = -b - sqrt_disc;
    let t2 = -b + sqrt_disc;

    if t1 > MIN_HIT_DISTANCE {
        Some(t1)
    } else if t2 > MIN_HIT_DISTANCE {
        Some(t2)
    } else {
        None
    }
}

/// Distance at which `ray` meets a rectangle, if it does.
///
/// The rectangle lies in the local XY plane of `transform` (a rigid
/// transform), centred on the local origin with the given half extents.
/// Both faces are hit.
pub fn intersect_rect(ray: &Ray, transform: &DMat4, half_width: f64, half_height: f64) -> Option<f64> {
    let to_local = transform.inverse();
    let origin = to_local.transform_point3(ray.origin);
    let direction = to_local.transform_vector3(ray.direction);

    if direction.z.abs() < 1e-12 {
        return None;
    }

    let t = -origin.z / direction.z;
    if t <= MIN_HIT_DISTANCE {
        return None;
    }

    let hit = origin + direction * t;
    if hit.x.abs() <= half_width && hit.y.abs() <= half_height {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_normalized() {
        let camera_pos = DVec3::new(0.0, 5.0, 10.0);
        for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            for y in [-1.0, -0.5, 0.0, 0.5, 1.0] {
                let ray = get_ray_direction(camera_pos, DVec3::ZERO, DVec2::new(x, y), 16.0 / 9.0, 1.2);
                assert!((ray.length() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera_pos = DVec3::new(0.0, 0.0, 3.0);
        let dir = get_ray_direction(camera_pos, DVec3::ZERO, DVec2::ZERO, 1.5, 0.8);
        assert!((dir - DVec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_right_of_screen_is_positive_x() {
        let camera_pos = DVec3::new(0.0, 0.0, 3.0);
        let dir = get_ray_direction(camera_pos, DVec3::ZERO, DVec2::new(1.0, 0.0), 1.0, 0.8);
        assert!(dir.x > 0.0);
        let dir = get_ray_direction(camera_pos, DVec3::ZERO, DVec2::new(0.0, 1.0), 1.0, 0.8);
        assert!(dir.y > 0.0);
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 3.0), DVec3::NEG_Z);
        let t = intersect_sphere(&ray, DVec3::ZERO, 1.0).unwrap();
        assert!((t - 2.0).abs() < 1e-12);
        assert!((ray.at(t) - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(DVec3::new(0.0, 2.0, 3.0), DVec3::NEG_Z);
        assert!(intersect_sphere(&ray, DVec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_behind_ray() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 3.0), DVec3::Z);
        assert!(intersect_sphere(&ray, DVec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_from_inside_returns_exit() {
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        let t = intersect_sphere(&ray, DVec3::ZERO, 1.0).unwrap();
        assert!((t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rect_hit_and_miss() {
        let transform = DMat4::from_translation(DVec3::new(0.0, 0.0, 1.0));
        let ray = Ray::new(DVec3::new(0.05, -0.05, 3.0), DVec3::NEG_Z);
        let t = intersect_rect(&ray, &transform, 0.1, 0.1).unwrap();
        assert!((t - 2.0).abs() < 1e-12);

        let outside = Ray::new(DVec3::new(0.2, 0.0, 3.0), DVec3::NEG_Z);
        assert!(intersect_rect(&outside, &transform, 0.1, 0.1).is_none());
    }

    #[test]
    fn test_rect_parallel_ray_misses() {
        let transform = DMat4::IDENTITY;
        let ray = Ray::new(DVec3::new(-1.0, 0.0, 0.0), DVec3::X);
        assert!(intersect_rect(&ray, &transform, 1.0, 1.0).is_none());
    }
}

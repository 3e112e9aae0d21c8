//! Mesh generation for the globe sphere and the photo quads.

use super::uniforms::MeshVertex;
use crate::world::to_surface_point;

/// Sphere resolution used by the renderer.
pub const GLOBE_SEGMENTS: u32 = 64;
pub const GLOBE_RINGS: u32 = 64;

/// Unit UV sphere laid out for an equirectangular map: u runs west to
/// east from longitude -180, v runs north to south.
pub fn uv_sphere(segments: u32, rings: u32) -> (Vec<MeshVertex>, Vec<u32>) {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

    for ring in 0..=rings {
        let v = ring as f64 / rings as f64;
        let lat = 90.0 - v * 180.0;
        for seg in 0..=segments {
            let u = seg as f64 / segments as f64;
            let lon = u * 360.0 - 180.0;
            let p = to_surface_point(lat, lon).as_vec3().to_array();
            vertices.push(MeshVertex {
                position: p,
                normal: p,
                uv: [u as f32, v as f32],
            });
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            // counter-clockwise seen from outside
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    (vertices, indices)
}

/// Unit quad in the XY plane facing +Z, centred on the origin.
pub fn unit_quad() -> (Vec<MeshVertex>, Vec<u32>) {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        MeshVertex { position: [-0.5, 0.5, 0.0], normal, uv: [0.0, 0.0] },
        MeshVertex { position: [0.5, 0.5, 0.0], normal, uv: [1.0, 0.0] },
        MeshVertex { position: [0.5, -0.5, 0.0], normal, uv: [1.0, 1.0] },
        MeshVertex { position: [-0.5, -0.5, 0.0], normal, uv: [0.0, 1.0] },
    ];
    let indices = vec![0, 3, 2, 0, 2, 1];
    (vertices, indices)
}

//! Point location and height interpolation in tile-local coordinates.
//!
//! All functions here work in the `(u, v, z)` frame of one tile, where `z` is
//! the quantized height channel. Conversion to meters happens in the caller.

use glam::{DVec2, DVec3};
use qmesh_decode::QuantizedMesh;
use qmesh_decode::spatial::{MAX_LEVEL, MIN_LEVEL};

use crate::seams::Skirt;

/// Slack on barycentric weights so points on shared triangle edges resolve.
const BARYCENTRIC_TOLERANCE: f64 = 1e-9;

/// Below this doubled area a triangle has no usable `(u, v)` footprint.
const DEGENERATE_AREA: f64 = 1e-12;

/// How far off a segment, in `(u, v)` units, a point may lie and still be
/// treated as on it.
const SEGMENT_TOLERANCE: f64 = 1e-6;

/// Outcome of a bulk elevation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    /// Every point resolved to a mesh or skirt triangle.
    Complete,
    /// Some points missed and were written as NaN.
    Partial { missed: usize },
}

impl BulkStatus {
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == BulkStatus::Complete
    }
}

/// Barycentric weights of `p` in the triangle `(a, b, c)`.
///
/// Returns `None` for triangles with a degenerate footprint or when `p` lies
/// outside the triangle. Points on an edge or vertex are inside.
#[must_use]
pub fn barycentric(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> Option<DVec3> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let area = ab.perp_dot(ac);
    if area.abs() < DEGENERATE_AREA {
        return None;
    }

    let wb = ap.perp_dot(ac) / area;
    let wc = ab.perp_dot(ap) / area;
    let wa = 1.0 - wb - wc;
    let weights = DVec3::new(wa, wb, wc);

    (weights.min_element() >= -BARYCENTRIC_TOLERANCE).then_some(weights)
}

/// Height of the triangle `corners` above `p`, if `p` lies inside it.
#[must_use]
pub fn interpolate_triangle(corners: [DVec3; 3], p: DVec2) -> Option<f64> {
    let [a, b, c] = corners;
    let weights = barycentric(p, a.truncate(), b.truncate(), c.truncate())?;
    Some(weights.dot(DVec3::new(a.z, b.z, c.z)))
}

/// Height along the segment `a`–`b` above `p`, if `p` lies on it.
///
/// A segment whose ends share a footprint is a vertical wall; a point on it
/// gets the mean of the two heights.
#[must_use]
pub fn interpolate_segment(a: DVec3, b: DVec3, p: DVec2) -> Option<f64> {
    let start = a.truncate();
    let direction = b.truncate() - start;
    let length_squared = direction.length_squared();
    if length_squared == 0.0 {
        return (p.distance(start) <= SEGMENT_TOLERANCE).then_some((a.z + b.z) / 2.0);
    }

    let t = (p - start).dot(direction) / length_squared;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let foot = start + direction * t;
    (p.distance(foot) <= SEGMENT_TOLERANCE).then(|| a.z + (b.z - a.z) * t)
}

/// Quantized height of the mesh at `(u, v)`.
///
/// Every spatial-index level is searched, finest first, and the first
/// triangle containing the point wins.
#[must_use]
pub fn locate_in_mesh(mesh: &QuantizedMesh, u: f64, v: f64) -> Option<f64> {
    let p = DVec2::new(u, v);
    (MIN_LEVEL..=MAX_LEVEL).rev().find_map(|level| {
        mesh.spatial_index
            .candidates(level, u, v)
            .find_map(|triangle_id| {
                let corners = mesh.triangle(triangle_id).map(|i| mesh.vertex_position(i));
                interpolate_triangle(corners, p)
            })
    })
}

/// Quantized height of the skirts at `(u, v)`.
///
/// Skirts lying in the boundary line have no area, so a point on one of
/// their footprint segments is interpolated along that segment.
#[must_use]
pub fn locate_in_skirts(skirts: &[Skirt], u: f64, v: f64) -> Option<f64> {
    let p = DVec2::new(u, v);
    skirts.iter().find_map(|skirt| {
        let [a, b, c] = skirt.corners;
        interpolate_triangle(skirt.corners, p)
            .or_else(|| interpolate_segment(a, b, p))
            .or_else(|| interpolate_segment(b, c, p))
            .or_else(|| interpolate_segment(c, a, p))
    })
}

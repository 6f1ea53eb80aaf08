//! Skirt synthesis along shared tile boundaries.
//!
//! Two adjacent tiles rarely share the same boundary vertices: a neighbor at
//! a finer level of detail has extra vertices along the edge, and heights
//! along the shared line differ wherever the two triangulations disagree.
//! Skirts are extra triangles in this tile's frame that close those gaps.
//!
//! Matching happens in geographic space, so the neighbor may sit at another
//! pyramid level. Each neighbor boundary vertex is projected through the
//! tiling scheme into this tile's `(u, v)`, snapped onto the shared boundary
//! line, and its height is rescaled from the neighbor's height range into
//! this tile's quantized height channel.

use glam::DVec3;
use qmesh_decode::{Edge, MAX_QUANTIZED, QuantizedMesh};

use crate::tiling::{TileKey, TilingScheme};

/// Positions closer than this along the boundary, in `(u, v)` units, coincide.
const ALONG_TOLERANCE: f64 = 1e-3;

/// Height differences below this, in quantized units, are not gaps.
const HEIGHT_TOLERANCE: f64 = 1e-3;

/// A synthetic triangle closing a gap along one tile edge.
///
/// Corners are in the tile's `(u, v, quantized height)` frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skirt {
    pub edge: Edge,
    pub corners: [DVec3; 3],
}

/// One side of a seam: a decoded tile and its pyramid address.
#[derive(Debug, Clone, Copy)]
pub struct SeamSide<'a> {
    pub mesh: &'a QuantizedMesh,
    pub key: TileKey,
}

/// Build the skirts for `edge` of `ours` against the tile across it.
///
/// The neighbor's boundary along the opposite edge is used. Returns an empty
/// list when the boundaries already agree or do not overlap.
#[must_use]
pub fn build_skirts(
    edge: Edge,
    ours: SeamSide<'_>,
    neighbor: SeamSide<'_>,
    tiling: &dyn TilingScheme,
) -> Vec<Skirt> {
    let own_points: Vec<DVec3> = ours
        .mesh
        .edge(edge)
        .iter()
        .map(|&index| ours.mesh.vertex_position(index))
        .collect();
    let neighbor_points = project_neighbor_edge(edge, ours, neighbor, tiling);

    let mut skirts = Vec::new();
    if neighbor_points.is_empty() {
        return skirts;
    }

    for pair in own_points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (start, end) = (along(edge, a), along(edge, b));
        if end - start <= ALONG_TOLERANCE {
            continue;
        }

        let mut interior = neighbor_points
            .iter()
            .filter(|(s, _)| *s > start + ALONG_TOLERANCE && *s < end - ALONG_TOLERANCE)
            .peekable();

        if interior.peek().is_some() {
            for &(s, z) in interior {
                let line = a.z + (b.z - a.z) * (s - start) / (end - start);
                if (z - line).abs() > HEIGHT_TOLERANCE {
                    skirts.push(Skirt {
                        edge,
                        corners: [a, b, boundary_point(edge, s, z)],
                    });
                }
            }
            continue;
        }

        let (Some(start_z), Some(end_z)) = (
            polyline_height(&neighbor_points, start),
            polyline_height(&neighbor_points, end),
        ) else {
            continue;
        };
        if (start_z - a.z).abs() <= HEIGHT_TOLERANCE && (end_z - b.z).abs() <= HEIGHT_TOLERANCE {
            continue;
        }

        let a_below = boundary_point(edge, start, start_z);
        let b_below = boundary_point(edge, end, end_z);
        skirts.push(Skirt {
            edge,
            corners: [a, b, b_below],
        });
        skirts.push(Skirt {
            edge,
            corners: [a, b_below, a_below],
        });
    }

    skirts
}

/// Neighbor boundary vertices as `(along, quantized height)` in our frame,
/// sorted along the edge.
fn project_neighbor_edge(
    edge: Edge,
    ours: SeamSide<'_>,
    neighbor: SeamSide<'_>,
    tiling: &dyn TilingScheme,
) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = neighbor
        .mesh
        .edge(edge.opposite())
        .iter()
        .map(|&index| {
            let position = neighbor.mesh.vertex_position(index);
            let (lat, lon) = tiling.uv_to_lat_lon(neighbor.key, position.x, position.y);
            let (u, v) = tiling.lat_lon_to_uv(ours.key, lat, lon);
            let meters = neighbor.mesh.header.height_to_meters(position.z);
            let z = ours.mesh.header.meters_to_height(meters);
            let s = if edge.runs_along_u() { u } else { v };
            (s, z)
        })
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
}

/// Coordinate of a point along `edge`.
fn along(edge: Edge, point: DVec3) -> f64 {
    if edge.runs_along_u() { point.x } else { point.y }
}

/// A point on the boundary line of `edge`.
fn boundary_point(edge: Edge, along: f64, z: f64) -> DVec3 {
    let max = f64::from(MAX_QUANTIZED);
    match edge {
        Edge::North => DVec3::new(along, max, z),
        Edge::South => DVec3::new(along, 0.0, z),
        Edge::East => DVec3::new(max, along, z),
        Edge::West => DVec3::new(0.0, along, z),
    }
}

/// Height of the neighbor boundary polyline at `s`, if `s` lies within it.
fn polyline_height(points: &[(f64, f64)], s: f64) -> Option<f64> {
    let (first, last) = (points.first()?, points.last()?);
    if s < first.0 - ALONG_TOLERANCE || s > last.0 + ALONG_TOLERANCE {
        return None;
    }

    let upper = points.partition_point(|&(ps, _)| ps < s);
    if upper == 0 {
        return Some(first.1);
    }
    if upper == points.len() {
        return Some(last.1);
    }
    let (s0, z0) = points[upper - 1];
    let (s1, z1) = points[upper];
    Some(z0 + (z1 - z0) * (s - s0) / (s1 - s0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::GeodeticTilingScheme;
    use qmesh_decode::header::{BoundingSphere, TileHeader};
    use qmesh_decode::{EdgeIndices, Extensions, IndexWidth, SpatialIndex, Vertices};

    /// A mesh whose quantized heights equal meters, with the given west and
    /// east boundary vertices `(v, height)` and no triangles.
    fn boundary_mesh(west: &[(u16, u16)], east: &[(u16, u16)]) -> QuantizedMesh {
        let mut vertices = Vertices::default();
        let mut edges = EdgeIndices::default();
        for (u, points, ids) in [(0, west, &mut edges.west), (32767, east, &mut edges.east)] {
            for &(v, height) in points {
                ids.push(vertices.len() as u32);
                vertices.u.push(u);
                vertices.v.push(v);
                vertices.height.push(height);
            }
        }

        QuantizedMesh {
            header: TileHeader {
                center: DVec3::ZERO,
                min_height: 0.0,
                max_height: 32767.0,
                bounding_sphere: BoundingSphere {
                    center: DVec3::ZERO,
                    radius: 0.0,
                },
                horizon_occlusion_point: DVec3::ZERO,
            },
            spatial_index: SpatialIndex::build(&vertices, &[]),
            vertices,
            index_width: IndexWidth::U16,
            indices: Vec::new(),
            edges,
            extensions: Extensions::default(),
        }
    }

    fn east_skirts(ours: &QuantizedMesh, neighbor: &QuantizedMesh) -> Vec<Skirt> {
        build_skirts(
            Edge::East,
            SeamSide {
                mesh: ours,
                key: TileKey::new(1, 1, 0),
            },
            SeamSide {
                mesh: neighbor,
                key: TileKey::new(1, 2, 0),
            },
            &GeodeticTilingScheme,
        )
    }

    #[test]
    fn test_matching_boundaries_need_no_skirts() {
        let ours = boundary_mesh(&[], &[(0, 100), (32767, 100)]);
        let neighbor = boundary_mesh(&[(0, 100), (32767, 100)], &[]);
        assert!(east_skirts(&ours, &neighbor).is_empty());
    }

    #[test]
    fn test_finer_neighbor_vertex_gets_one_skirt() {
        let ours = boundary_mesh(&[], &[(0, 100), (32767, 100)]);
        let neighbor = boundary_mesh(&[(0, 100), (16384, 200), (32767, 100)], &[]);

        let skirts = east_skirts(&ours, &neighbor);
        assert_eq!(skirts.len(), 1);
        let [a, b, n] = skirts[0].corners;
        assert_eq!(a, DVec3::new(32767.0, 0.0, 100.0));
        assert_eq!(b, DVec3::new(32767.0, 32767.0, 100.0));
        assert_eq!(n.x, 32767.0);
        assert!((n.y - 16384.0).abs() < 1e-6);
        assert!((n.z - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_height_gap_gets_two_skirts() {
        let ours = boundary_mesh(&[], &[(0, 100), (32767, 120)]);
        let neighbor = boundary_mesh(&[(0, 150), (32767, 150)], &[]);

        let skirts = east_skirts(&ours, &neighbor);
        assert_eq!(skirts.len(), 2);
        let [_, _, b_below] = skirts[0].corners;
        let [_, _, a_below] = skirts[1].corners;
        assert!((b_below - DVec3::new(32767.0, 32767.0, 150.0)).abs().max_element() < 1e-6);
        assert!((a_below - DVec3::new(32767.0, 0.0, 150.0)).abs().max_element() < 1e-6);
        assert!(skirts.iter().all(|skirt| skirt.edge == Edge::East));
    }

    #[test]
    fn test_empty_neighbor_edge() {
        let ours = boundary_mesh(&[], &[(0, 100), (32767, 100)]);
        let neighbor = boundary_mesh(&[], &[]);
        assert!(east_skirts(&ours, &neighbor).is_empty());
    }

    #[test]
    fn test_polyline_height() {
        let points = [(0.0, 10.0), (10.0, 20.0), (20.0, 0.0)];
        assert_eq!(polyline_height(&points, 5.0), Some(15.0));
        assert_eq!(polyline_height(&points, 10.0), Some(20.0));
        assert_eq!(polyline_height(&points, 20.0), Some(0.0));
        assert_eq!(polyline_height(&points, 0.0), Some(10.0));
        assert_eq!(polyline_height(&points, 25.0), None);
        assert_eq!(polyline_height(&[], 0.0), None);
    }
}

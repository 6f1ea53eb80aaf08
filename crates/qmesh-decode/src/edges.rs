//! Edge index unpacking.

use crate::error::{DecodeError, DecodeResult};
use crate::indices::IndexWidth;
use crate::reader::ByteReader;
use crate::vertices::Vertices;

/// A side of the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    North,
    East,
    South,
    West,
}

impl Edge {
    /// All edges, clockwise from north. Neighbor arrays use this order.
    pub const ALL: [Edge; 4] = [Edge::North, Edge::East, Edge::South, Edge::West];

    /// Order in which edge blocks appear in a tile.
    pub const WIRE_ORDER: [Edge; 4] = [Edge::West, Edge::South, Edge::East, Edge::North];

    /// Position of this edge in [`Edge::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Edge::North => 0,
            Edge::East => 1,
            Edge::South => 2,
            Edge::West => 3,
        }
    }

    /// The edge a neighbor across this edge shares with us.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Edge::North => Edge::South,
            Edge::East => Edge::West,
            Edge::South => Edge::North,
            Edge::West => Edge::East,
        }
    }

    /// Whether the edge runs along `u` (north and south edges) rather than
    /// along `v`.
    #[must_use]
    pub fn runs_along_u(self) -> bool {
        matches!(self, Edge::North | Edge::South)
    }

    /// Coordinate of a vertex along this edge: `u` for north and south,
    /// `v` for east and west.
    #[must_use]
    pub fn along(self, vertices: &Vertices, index: usize) -> u16 {
        if self.runs_along_u() {
            vertices.u[index]
        } else {
            vertices.v[index]
        }
    }
}

/// Vertex ids on each tile boundary, each sorted by the coordinate that runs
/// along its edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeIndices {
    pub north: Vec<u32>,
    pub east: Vec<u32>,
    pub south: Vec<u32>,
    pub west: Vec<u32>,
}

impl EdgeIndices {
    #[must_use]
    pub fn get(&self, edge: Edge) -> &[u32] {
        match edge {
            Edge::North => &self.north,
            Edge::East => &self.east,
            Edge::South => &self.south,
            Edge::West => &self.west,
        }
    }

    fn get_mut(&mut self, edge: Edge) -> &mut Vec<u32> {
        match edge {
            Edge::North => &mut self.north,
            Edge::East => &mut self.east,
            Edge::South => &mut self.south,
            Edge::West => &mut self.west,
        }
    }
}

/// Unpack the four edge blocks (west, south, east, north).
///
/// Each block is a `u32` length followed by that many plain indices of the
/// tile's index width. After reading, each block is sorted so that two
/// adjacent tiles' shared edges can be walked in step: north and south by
/// `u`, east and west by `v`.
pub fn unpack_edge_indices(
    reader: &mut ByteReader<'_>,
    vertices: &Vertices,
) -> DecodeResult<EdgeIndices> {
    let width = IndexWidth::for_vertex_count(vertices.len());
    let mut edges = EdgeIndices::default();

    for edge in Edge::WIRE_ORDER {
        let count = reader.read_count(width.size(), "edge count")?;
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            let index = reader.read_index(width, "edge indices")?;
            if index as usize >= vertices.len() {
                return Err(DecodeError::IndexOutOfBounds {
                    context: "edge",
                    index: index as usize,
                    len: vertices.len(),
                });
            }
            indices.push(index);
        }

        indices.sort_by_key(|&index| edge.along(vertices, index as usize));
        *edges.get_mut(edge) = indices;
    }

    Ok(edges)
}

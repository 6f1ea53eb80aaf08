//! Whole-tile decoding.

use glam::DVec3;

use crate::edges::{Edge, EdgeIndices, unpack_edge_indices};
use crate::error::DecodeResult;
use crate::extensions::{Extensions, unpack_extensions};
use crate::header::{TileHeader, read_header};
use crate::indices::{IndexWidth, unpack_triangles};
use crate::reader::ByteReader;
use crate::spatial::SpatialIndex;
use crate::vertices::{Vertices, unpack_vertices};

/// A fully decoded quantized-mesh tile.
#[derive(Debug, Clone)]
pub struct QuantizedMesh {
    pub header: TileHeader,
    pub vertices: Vertices,
    /// Width the indices were stored with.
    pub index_width: IndexWidth,
    /// Triangle list; triangle `t` is `indices[3t..3t + 3]`.
    pub indices: Vec<u32>,
    pub spatial_index: SpatialIndex,
    pub edges: EdgeIndices,
    pub extensions: Extensions,
}

impl QuantizedMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex ids of a triangle.
    ///
    /// # Panics
    ///
    /// Panics if `triangle_id` is out of range.
    #[must_use]
    pub fn triangle(&self, triangle_id: u32) -> [u32; 3] {
        let base = triangle_id as usize * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    /// Tile-local `(u, v, height)` of a vertex.
    #[must_use]
    pub fn vertex_position(&self, index: u32) -> DVec3 {
        self.vertices.position(index as usize)
    }

    /// Sorted boundary vertex ids for one edge.
    #[must_use]
    pub fn edge(&self, edge: Edge) -> &[u32] {
        self.edges.get(edge)
    }
}

/// Decode a complete tile.
///
/// Sections are read in their fixed order: header, vertices, triangle
/// indices (from which the spatial index is built), edge indices and
/// extensions. Any failure aborts the decode and nothing is returned.
pub fn decode_quantized_mesh(data: &[u8]) -> DecodeResult<QuantizedMesh> {
    let mut reader = ByteReader::new(data);

    let header = read_header(&mut reader)?;
    let vertices = unpack_vertices(&mut reader)?;
    let index_width = IndexWidth::for_vertex_count(vertices.len());
    let indices = unpack_triangles(&mut reader, vertices.len())?;
    let spatial_index = SpatialIndex::build(&vertices, &indices);
    let edges = unpack_edge_indices(&mut reader, &vertices)?;
    let extensions = unpack_extensions(&mut reader)?;

    Ok(QuantizedMesh {
        header,
        vertices,
        index_width,
        indices,
        spatial_index,
        edges,
        extensions,
    })
}

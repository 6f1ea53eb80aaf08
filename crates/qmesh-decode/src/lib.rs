//! Decode quantized-mesh terrain tiles.
//!
//! A quantized-mesh tile describes a triangulated height field over one cell
//! of a global tile pyramid. This crate turns the raw tile bytes into plain
//! data: the header, the quantized vertices, the triangle list with a
//! spatial index over it, and the sorted boundary vertices of each edge.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives, no I/O
//! - **All or nothing**: A decode either yields a complete tile or an error
//! - **Stream order**: Sections are decoded strictly in file order; the
//!   vertex and index codings cannot be decoded out of sequence
//!
//! # Layout
//!
//! | Section | Contents |
//! |---|---|
//! | Header | center, height range, bounding sphere, horizon occlusion point (88 bytes) |
//! | Vertices | count, then zigzag-delta `u`, `v` and height runs |
//! | Indices | triangle count, then high-water-mark coded indices |
//! | Edges | west, south, east and north vertex id blocks |
//! | Extensions | optional `(id, length, data)` records |

pub mod edges;
mod error;
pub mod extensions;
pub mod header;
pub mod indices;
pub mod mesh;
pub mod reader;
pub mod spatial;
pub mod vertices;

#[cfg(test)]
pub(crate) mod test_support;

pub use edges::{Edge, EdgeIndices};
pub use error::{DecodeError, DecodeResult};
pub use extensions::{Extension, Extensions};
pub use header::{BoundingSphere, HEADER_SIZE, TileHeader};
pub use indices::IndexWidth;
pub use mesh::{QuantizedMesh, decode_quantized_mesh};
pub use reader::ByteReader;
pub use spatial::SpatialIndex;
pub use vertices::{MAX_QUANTIZED, Vertices};

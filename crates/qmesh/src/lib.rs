//! Elevation queries over quantized-mesh terrain tiles.
//!
//! This crate wraps the decoders in `qmesh-decode` with the state a terrain
//! service needs around a single tile: lazy, one-shot parsing from a byte
//! source, point and bulk elevation queries, and skirt synthesis against
//! neighboring tiles to close level-of-detail gaps along shared edges.
//!
//! # Example
//!
//! ```no_run
//! use qmesh::{ConstantGeoid, TerrainConfig, TerrainTile};
//!
//! let config = TerrainConfig::default().with_geoid(ConstantGeoid(-33.0));
//! let tile = TerrainTile::new(qmesh::FileSource::new("12/2300/2865.terrain"), 12, config);
//!
//! let msl = tile.elevation(35.925, -78.903, false)?;
//! let hae = tile.elevation(35.925, -78.903, true)?;
//! # Ok::<(), qmesh::Error>(())
//! ```
//!
//! # Design principles
//!
//! - **Synchronous**: No async; callers decide which thread does the work
//! - **One lock per tile**: Parsing, queries and seam resolution are
//!   serialized per tile, and neighbors are only ever read
//! - **Misses are values**: Points the tile does not cover yield NaN, not
//!   errors

pub mod config;
pub mod datum;
mod error;
pub mod geo;
pub mod query;
pub mod seams;
pub mod source;
pub mod tile;
pub mod tiling;

pub use config::TerrainConfig;
pub use datum::{ConstantGeoid, GeoidModel};
pub use error::{Error, Result};
pub use query::BulkStatus;
pub use seams::Skirt;
pub use source::{FileSource, MemorySource, TileSource};
pub use tile::{BulkRequest, TerrainTile};
pub use tiling::{GeoBounds, GeodeticTilingScheme, TileKey, TilingScheme};

// Re-export decode types that appear in this crate's API.
pub use qmesh_decode::{DecodeError, Edge, TileHeader};

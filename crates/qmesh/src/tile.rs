//! The terrain tile: lazy parsing, elevation queries and seam resolution.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qmesh_decode::{Edge, QuantizedMesh, TileHeader, decode_quantized_mesh};

use crate::config::TerrainConfig;
use crate::error::{Error, Result};
use crate::geo::ecef_to_geodetic;
use crate::query::{BulkStatus, locate_in_mesh, locate_in_skirts};
use crate::seams::{SeamSide, Skirt, build_skirts};
use crate::source::{FileSource, MemorySource, TileSource};
use crate::tiling::TileKey;

/// How the tile's pyramid address is known.
#[derive(Debug, Clone, Copy)]
enum Address {
    /// Only the level is known; `x` and `y` come from the header center.
    Level(u32),
    Key(TileKey),
}

/// A successfully decoded tile together with its address.
#[derive(Debug)]
struct ParsedTile {
    key: TileKey,
    mesh: QuantizedMesh,
}

#[derive(Debug)]
enum ParseState {
    Pending,
    Ready(Arc<ParsedTile>),
    /// Parsing failed. The error has already been reported once.
    Failed(Error),
}

#[derive(Debug)]
struct TileState {
    parse: ParseState,
    skirts: Vec<Skirt>,
    /// Per-edge resolution flags, indexed by [`Edge::index`].
    resolved: [bool; 4],
}

/// Coordinates for a bulk elevation query.
///
/// Point `i` reads `lat[i * lat_stride]` and `lon[i * lon_stride]` and writes
/// its elevation to `dst[i * dst_stride]`. A source stride of 0 reuses the
/// first element for every point.
#[derive(Debug, Clone, Copy)]
pub struct BulkRequest<'a> {
    pub count: usize,
    pub lat: &'a [f64],
    pub lon: &'a [f64],
    pub lat_stride: usize,
    pub lon_stride: usize,
    pub dst_stride: usize,
    pub convert_to_hae: bool,
}

impl<'a> BulkRequest<'a> {
    /// A request over tightly packed coordinate arrays of equal length.
    #[must_use]
    pub fn contiguous(lat: &'a [f64], lon: &'a [f64], convert_to_hae: bool) -> Self {
        Self {
            count: lat.len().min(lon.len()),
            lat,
            lon,
            lat_stride: 1,
            lon_stride: 1,
            dst_stride: 1,
            convert_to_hae,
        }
    }
}

/// A quantized-mesh terrain tile.
///
/// The tile bytes are read and decoded on first use. A failed decode is
/// permanent: the first call reports the decode error and later calls
/// report [`Error::IllegalState`].
///
/// All queries and seam resolution are serialized through one lock per tile,
/// so a tile can be shared freely between threads.
pub struct TerrainTile {
    source: Box<dyn TileSource>,
    address: Address,
    config: TerrainConfig,
    state: Mutex<TileState>,
}

impl std::fmt::Debug for TerrainTile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainTile")
            .field("source", &self.source.describe())
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl TerrainTile {
    fn with_address(
        source: impl TileSource + 'static,
        address: Address,
        config: TerrainConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            address,
            config,
            state: Mutex::new(TileState {
                parse: ParseState::Pending,
                skirts: Vec::new(),
                resolved: [false; 4],
            }),
        }
    }

    /// A tile stored at `path`, at pyramid `level`, with the default
    /// configuration. Nothing is read until the tile is first used.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, level: u32) -> Self {
        Self::new(FileSource::new(path), level, TerrainConfig::default())
    }

    /// A tile at pyramid `level` read from `source`.
    ///
    /// The tile's `x` and `y` are derived from the header center.
    #[must_use]
    pub fn new(source: impl TileSource + 'static, level: u32, config: TerrainConfig) -> Self {
        Self::with_address(source, Address::Level(level), config)
    }

    /// A tile with a known pyramid address.
    #[must_use]
    pub fn with_key(source: impl TileSource + 'static, key: TileKey, config: TerrainConfig) -> Self {
        Self::with_address(source, Address::Key(key), config)
    }

    /// A tile at pyramid `level` decoded from bytes already in memory.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, level: u32, config: TerrainConfig) -> Self {
        Self::new(MemorySource::new(bytes), level, config)
    }

    #[must_use]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, TileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read and decode the tile if that has not happened yet.
    pub fn parse(&self) -> Result<()> {
        self.parsed().map(|_| ())
    }

    fn parsed(&self) -> Result<Arc<ParsedTile>> {
        let mut state = self.lock();
        self.ensure_parsed(&mut state)
    }

    fn ensure_parsed(&self, state: &mut TileState) -> Result<Arc<ParsedTile>> {
        match &state.parse {
            ParseState::Ready(parsed) => return Ok(Arc::clone(parsed)),
            ParseState::Failed(err) => {
                return Err(Error::IllegalState {
                    reason: format!("tile {} failed to parse: {err}", self.source.describe()),
                });
            }
            ParseState::Pending => {}
        }

        match self.load() {
            Ok(parsed) => {
                let parsed = Arc::new(parsed);
                state.parse = ParseState::Ready(Arc::clone(&parsed));
                Ok(parsed)
            }
            Err(err) => {
                tracing::warn!("Failed to parse tile {}: {err}", self.source.describe());
                state.parse = ParseState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn load(&self) -> Result<ParsedTile> {
        let bytes = self.source.read_bytes()?;
        let mesh = decode_quantized_mesh(&bytes)?;

        let key = match self.address {
            Address::Key(key) => key,
            Address::Level(level) => {
                let center = ecef_to_geodetic(mesh.header.center);
                self.config.tiling.tile_at(level, center.lat, center.lon)
            }
        };

        if mesh.extensions.trailing_bytes > 0 {
            tracing::debug!(
                "Ignoring {} trailing bytes in tile {key}",
                mesh.extensions.trailing_bytes
            );
        }
        tracing::info!(
            "Parsed tile {key}: {} vertices, {} triangles, {:?} indices",
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.index_width
        );

        Ok(ParsedTile { key, mesh })
    }

    /// Pyramid address of the tile.
    pub fn key(&self) -> Result<TileKey> {
        Ok(self.parsed()?.key)
    }

    pub fn header(&self) -> Result<TileHeader> {
        Ok(self.parsed()?.mesh.header)
    }

    pub fn vertex_count(&self) -> Result<usize> {
        Ok(self.parsed()?.mesh.vertices.len())
    }

    pub fn triangle_count(&self) -> Result<usize> {
        Ok(self.parsed()?.mesh.triangle_count())
    }

    /// Skirts synthesized so far.
    #[must_use]
    pub fn skirts(&self) -> Vec<Skirt> {
        self.lock().skirts.clone()
    }

    /// Elevation at `(lat, lon)` in meters, or NaN if the tile has no data
    /// there.
    ///
    /// With `convert_to_hae` the elevation is converted from mean sea level
    /// to height above the ellipsoid using the configured geoid; without a
    /// geoid value at the point the result is NaN.
    pub fn elevation(&self, lat: f64, lon: f64, convert_to_hae: bool) -> Result<f64> {
        let mut state = self.lock();
        let parsed = self.ensure_parsed(&mut state)?;
        Ok(self.elevation_locked(&parsed, &state.skirts, lat, lon, convert_to_hae))
    }

    /// Elevation at tile-local `(u, v)` in meters, or NaN if the tile has no
    /// data there.
    pub fn elevation_at_uv(&self, u: f64, v: f64, convert_to_hae: bool) -> Result<f64> {
        let mut state = self.lock();
        let parsed = self.ensure_parsed(&mut state)?;

        let Some((u, v)) = self.clamp_to_tile(u, v) else {
            return Ok(f64::NAN);
        };
        let meters = locate(&parsed.mesh, &state.skirts, u, v);
        if !convert_to_hae {
            return Ok(meters);
        }
        let (lat, lon) = self.config.tiling.uv_to_lat_lon(parsed.key, u, v);
        Ok(self.to_hae(meters, lat, lon))
    }

    /// Elevations for many points at once.
    ///
    /// Each point gets exactly the value [`TerrainTile::elevation`] would
    /// return for it. Misses are written as NaN and counted in the returned
    /// status.
    pub fn elevation_bulk(&self, dst: &mut [f64], request: &BulkRequest<'_>) -> Result<BulkStatus> {
        validate_bulk(dst.len(), request)?;

        let mut state = self.lock();
        let parsed = self.ensure_parsed(&mut state)?;

        let mut missed = 0;
        for i in 0..request.count {
            let lat = request.lat[i * request.lat_stride];
            let lon = request.lon[i * request.lon_stride];
            let elevation =
                self.elevation_locked(&parsed, &state.skirts, lat, lon, request.convert_to_hae);
            if elevation.is_nan() {
                missed += 1;
            }
            dst[i * request.dst_stride] = elevation;
        }

        Ok(if missed == 0 {
            BulkStatus::Complete
        } else {
            BulkStatus::Partial { missed }
        })
    }

    fn elevation_locked(
        &self,
        parsed: &ParsedTile,
        skirts: &[Skirt],
        lat: f64,
        lon: f64,
        convert_to_hae: bool,
    ) -> f64 {
        let (u, v) = self.config.tiling.lat_lon_to_uv(parsed.key, lat, lon);
        let Some((u, v)) = self.clamp_to_tile(u, v) else {
            return f64::NAN;
        };
        let meters = locate(&parsed.mesh, skirts, u, v);
        if convert_to_hae {
            self.to_hae(meters, lat, lon)
        } else {
            meters
        }
    }

    /// Clamp `(u, v)` onto the tile if it lies within the edge tolerance.
    fn clamp_to_tile(&self, u: f64, v: f64) -> Option<(f64, f64)> {
        let tolerance = self.config.edge_tolerance;
        let max = f64::from(qmesh_decode::MAX_QUANTIZED);
        let inside = |value: f64| value >= -tolerance && value <= max + tolerance;
        (inside(u) && inside(v)).then(|| (u.clamp(0.0, max), v.clamp(0.0, max)))
    }

    fn to_hae(&self, meters: f64, lat: f64, lon: f64) -> f64 {
        self.config
            .geoid
            .as_ref()
            .and_then(|geoid| geoid.geoid_offset(lat, lon))
            .map_or(f64::NAN, |offset| meters + offset)
    }

    /// Synthesize skirts against the neighboring tiles.
    ///
    /// `neighbors` are ordered north, east, south, west; absent entries are
    /// skipped. Each edge is resolved at most once, so repeated calls only
    /// fill in edges whose neighbors were missing before. A neighbor that
    /// cannot be parsed leaves its edge unresolved.
    ///
    /// Neighbors are only read. Their data is snapshotted under their own
    /// lock before this tile's lock is taken, so tiles resolving against each
    /// other from different threads cannot deadlock.
    pub fn resolve_seams(&self, neighbors: [Option<&TerrainTile>; 4]) -> Result<()> {
        let ours = self.parsed()?;
        let already_resolved = self.lock().resolved;

        let mut resolved = Vec::new();
        for (edge, neighbor) in Edge::ALL.into_iter().zip(neighbors) {
            let Some(neighbor) = neighbor else {
                continue;
            };
            if already_resolved[edge.index()] {
                continue;
            }

            let theirs = match neighbor.parsed() {
                Ok(theirs) => theirs,
                Err(err) => {
                    tracing::warn!("Skipping {edge:?} seam of tile {}: {err}", ours.key);
                    continue;
                }
            };

            let skirts = build_skirts(
                edge,
                SeamSide {
                    mesh: &ours.mesh,
                    key: ours.key,
                },
                SeamSide {
                    mesh: &theirs.mesh,
                    key: theirs.key,
                },
                self.config.tiling.as_ref(),
            );
            resolved.push((edge, skirts));
        }

        let mut state = self.lock();
        for (edge, skirts) in resolved {
            if state.resolved[edge.index()] {
                continue;
            }
            tracing::debug!(
                "Resolved {edge:?} seam of tile {} with {} skirts",
                ours.key,
                skirts.len()
            );
            state.skirts.extend(skirts);
            state.resolved[edge.index()] = true;
        }

        Ok(())
    }

    /// Whether all four edges have been resolved.
    #[must_use]
    pub fn is_seams_resolved(&self) -> bool {
        self.lock().resolved.iter().all(|&resolved| resolved)
    }

    #[must_use]
    pub fn is_edge_resolved(&self, edge: Edge) -> bool {
        self.lock().resolved[edge.index()]
    }
}

/// Elevation in meters at in-tile `(u, v)`, trying mesh triangles before
/// skirts.
fn locate(mesh: &QuantizedMesh, skirts: &[Skirt], u: f64, v: f64) -> f64 {
    locate_in_mesh(mesh, u, v)
        .or_else(|| locate_in_skirts(skirts, u, v))
        .map_or(f64::NAN, |z| mesh.header.height_to_meters(z))
}

fn validate_bulk(dst_len: usize, request: &BulkRequest<'_>) -> Result<()> {
    if request.count == 0 {
        return Ok(());
    }
    if request.count > 1 && request.dst_stride == 0 {
        return Err(Error::InvalidArgument {
            context: "destination stride",
            detail: "must be non-zero for more than one point".to_string(),
        });
    }

    let last = request.count - 1;
    for (context, len, stride) in [
        ("latitude array", request.lat.len(), request.lat_stride),
        ("longitude array", request.lon.len(), request.lon_stride),
        ("destination array", dst_len, request.dst_stride),
    ] {
        let needed = last
            .checked_mul(stride)
            .and_then(|offset| offset.checked_add(1))
            .ok_or_else(|| Error::InvalidArgument {
                context,
                detail: "stride overflows".to_string(),
            })?;
        if len < needed {
            return Err(Error::InvalidArgument {
                context,
                detail: format!(
                    "{} points with stride {stride} need {needed} elements, got {len}",
                    request.count
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(lat: &'a [f64], lon: &'a [f64]) -> BulkRequest<'a> {
        BulkRequest::contiguous(lat, lon, false)
    }

    #[test]
    fn test_validate_bulk_lengths() {
        let coords = [0.0; 4];
        assert!(validate_bulk(4, &request(&coords, &coords)).is_ok());

        let err = validate_bulk(3, &request(&coords, &coords)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument {
                context: "destination array",
                ..
            }
        ));

        let short = [0.0; 2];
        let err = validate_bulk(4, &request(&coords, &short)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_validate_bulk_strides() {
        let coords = [0.0; 6];
        let strided = BulkRequest {
            count: 3,
            lat_stride: 2,
            lon_stride: 0,
            dst_stride: 3,
            ..request(&coords, &coords)
        };
        assert!(validate_bulk(7, &strided).is_ok());
        assert!(validate_bulk(6, &strided).is_err());

        let zero_dst = BulkRequest {
            dst_stride: 0,
            ..strided
        };
        assert!(validate_bulk(7, &zero_dst).is_err());
    }

    #[test]
    fn test_validate_empty_bulk() {
        let empty = BulkRequest::contiguous(&[], &[], false);
        assert!(validate_bulk(0, &empty).is_ok());
    }

    #[test]
    fn test_missing_file_fails_then_illegal_state() {
        let tile = TerrainTile::open("/nonexistent/qmesh/tile.terrain", 3);
        assert!(matches!(tile.parse(), Err(Error::Io { .. })));
        assert!(matches!(
            tile.elevation(0.0, 0.0, false),
            Err(Error::IllegalState { .. })
        ));
        assert!(!tile.is_seams_resolved());
    }
}

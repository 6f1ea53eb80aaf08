//! Tile pyramid addressing and the projection between geographic and
//! tile-local coordinates.

use std::fmt;

use qmesh_decode::MAX_QUANTIZED;

/// Address of a tile in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub level: u32,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    #[must_use]
    pub fn new(level: u32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.x, self.y)
    }
}

/// Geographic extent of a tile, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check if a coordinate falls within these bounds (edges inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }
}

/// Projection collaborator: maps tile addresses to geographic extents.
///
/// Tile-local coordinates run linearly across the tile bounds, `u` eastward
/// from the west edge and `v` northward from the south edge, both over
/// `0..=32767`.
pub trait TilingScheme: Send + Sync {
    /// Geographic bounds of a tile.
    fn tile_bounds(&self, key: TileKey) -> GeoBounds;

    /// The tile at `level` containing `(lat, lon)`.
    fn tile_at(&self, level: u32, lat: f64, lon: f64) -> TileKey;

    /// Convert tile-local `(u, v)` to `(lat, lon)` in degrees.
    fn uv_to_lat_lon(&self, key: TileKey, u: f64, v: f64) -> (f64, f64) {
        let bounds = self.tile_bounds(key);
        let scale = f64::from(MAX_QUANTIZED);
        (
            bounds.south + v / scale * bounds.height(),
            bounds.west + u / scale * bounds.width(),
        )
    }

    /// Convert `(lat, lon)` in degrees to tile-local `(u, v)`.
    ///
    /// The result is not clamped; points outside the tile map outside
    /// `0..=32767`.
    fn lat_lon_to_uv(&self, key: TileKey, lat: f64, lon: f64) -> (f64, f64) {
        let bounds = self.tile_bounds(key);
        let scale = f64::from(MAX_QUANTIZED);
        (
            (lon - bounds.west) / bounds.width() * scale,
            (lat - bounds.south) / bounds.height() * scale,
        )
    }
}

/// The WGS84 geographic pyramid.
///
/// Level 0 is two tiles side by side, each 180 degrees square. Every level
/// halves the tile size. `x` counts eastward from the antimeridian and `y`
/// counts northward from the south pole.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodeticTilingScheme;

impl GeodeticTilingScheme {
    /// Tile size at `level`, in degrees.
    #[must_use]
    pub fn tile_size(level: u32) -> f64 {
        180.0 / 2f64.powi(level.min(62) as i32)
    }

    /// Number of tiles along `x` and `y` at `level`.
    #[must_use]
    pub fn tile_counts(level: u32) -> (u64, u64) {
        let rows = 1u64 << level.min(62);
        (rows * 2, rows)
    }
}

impl TilingScheme for GeodeticTilingScheme {
    fn tile_bounds(&self, key: TileKey) -> GeoBounds {
        let size = Self::tile_size(key.level);
        let west = -180.0 + f64::from(key.x) * size;
        let south = -90.0 + f64::from(key.y) * size;
        GeoBounds {
            west,
            south,
            east: west + size,
            north: south + size,
        }
    }

    fn tile_at(&self, level: u32, lat: f64, lon: f64) -> TileKey {
        let size = Self::tile_size(level);
        let (columns, rows) = Self::tile_counts(level);
        let index = |offset: f64, count: u64| {
            let cell = (offset / size).floor();
            (cell.max(0.0) as u64).min(count - 1) as u32
        };
        TileKey {
            level,
            x: index(lon + 180.0, columns),
            y: index(lat + 90.0, rows),
        }
    }
}

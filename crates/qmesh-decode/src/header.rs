//! Tile header unpacking.

use glam::DVec3;

use crate::error::DecodeResult;
use crate::reader::ByteReader;
use crate::vertices::MAX_QUANTIZED;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 88;

/// Bounding sphere of the tile in Earth-centered, Earth-fixed coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

/// Fixed-size metadata at the start of every tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHeader {
    /// Tile center in Earth-centered, Earth-fixed coordinates (meters).
    pub center: DVec3,
    /// Height of the lowest vertex in meters.
    pub min_height: f32,
    /// Height of the highest vertex in meters.
    pub max_height: f32,
    pub bounding_sphere: BoundingSphere,
    /// Horizon occlusion point, in the ellipsoid-scaled ECEF frame.
    pub horizon_occlusion_point: DVec3,
}

impl TileHeader {
    /// Height span covered by the quantized height channel, in meters.
    #[must_use]
    pub fn height_range(&self) -> f64 {
        f64::from(self.max_height) - f64::from(self.min_height)
    }

    /// Convert a quantized height (`0..=32767`, fractional values allowed)
    /// to meters.
    #[must_use]
    pub fn height_to_meters(&self, z: f64) -> f64 {
        f64::from(self.min_height) + z * self.height_range() / f64::from(MAX_QUANTIZED)
    }

    /// Convert a height in meters to this tile's quantized height scale.
    ///
    /// The result is not clamped; heights outside the tile's range map
    /// outside `0..=32767`. A flat tile (zero height range) maps every height
    /// to 0.
    #[must_use]
    pub fn meters_to_height(&self, meters: f64) -> f64 {
        let range = self.height_range();
        if range <= 0.0 {
            return 0.0;
        }
        (meters - f64::from(self.min_height)) * f64::from(MAX_QUANTIZED) / range
    }
}

/// Read the 88-byte header.
///
/// # Format
///
/// - Center: 3 × f64
/// - Minimum and maximum height: 2 × f32
/// - Bounding sphere center and radius: 4 × f64
/// - Horizon occlusion point: 3 × f64
pub fn read_header(reader: &mut ByteReader<'_>) -> DecodeResult<TileHeader> {
    // Check up front so a short header fails before any field is read.
    reader.ensure(HEADER_SIZE, "header")?;

    let center = read_dvec3(reader)?;
    let min_height = reader.read_f32("header")?;
    let max_height = reader.read_f32("header")?;
    let sphere_center = read_dvec3(reader)?;
    let radius = reader.read_f64("header")?;
    let horizon_occlusion_point = read_dvec3(reader)?;

    Ok(TileHeader {
        center,
        min_height,
        max_height,
        bounding_sphere: BoundingSphere {
            center: sphere_center,
            radius,
        },
        horizon_occlusion_point,
    })
}

fn read_dvec3(reader: &mut ByteReader<'_>) -> DecodeResult<DVec3> {
    Ok(DVec3::new(
        reader.read_f64("header")?,
        reader.read_f64("header")?,
        reader.read_f64("header")?,
    ))
}

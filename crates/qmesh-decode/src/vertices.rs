//! Vertex unpacking.

use glam::DVec3;

use crate::error::DecodeResult;
use crate::reader::ByteReader;

/// Largest quantized coordinate or height value.
pub const MAX_QUANTIZED: u16 = 32767;

/// Quantized vertex positions stored as three parallel arrays.
///
/// `u` runs west to east and `v` south to north across the tile, both over
/// `0..=32767`. `height` spans the header's minimum to maximum height.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vertices {
    pub u: Vec<u16>,
    pub v: Vec<u16>,
    pub height: Vec<u16>,
}

impl Vertices {
    #[must_use]
    pub fn len(&self) -> usize {
        self.u.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    /// Tile-local position of a vertex as `(u, v, height)`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn position(&self, index: usize) -> DVec3 {
        DVec3::new(
            f64::from(self.u[index]),
            f64::from(self.v[index]),
            f64::from(self.height[index]),
        )
    }
}

/// Map a zigzag code back to its signed delta.
#[must_use]
pub fn zigzag_decode(code: u16) -> i32 {
    let code = i32::from(code);
    (code >> 1) ^ -(code & 1)
}

/// Unpack the vertex section: a `u32` count followed by the `u`, `v` and
/// height runs.
///
/// Each run holds `count` zigzag-coded `u16` deltas. A run is the running
/// sum of its deltas starting from zero, so the runs must be decoded in
/// order and element by element.
pub fn unpack_vertices(reader: &mut ByteReader<'_>) -> DecodeResult<Vertices> {
    let count = reader.read_count(3 * 2, "vertex count")?;

    let u = decode_run(reader, count, "vertex u")?;
    let v = decode_run(reader, count, "vertex v")?;
    let height = decode_run(reader, count, "vertex height")?;

    Ok(Vertices { u, v, height })
}

fn decode_run(
    reader: &mut ByteReader<'_>,
    count: usize,
    context: &'static str,
) -> DecodeResult<Vec<u16>> {
    let mut values = Vec::with_capacity(count);
    let mut value: u16 = 0;

    for _ in 0..count {
        let delta = zigzag_decode(reader.read_u16(context)?);
        // Values live in the 16-bit domain; out-of-range sums wrap.
        value = value.wrapping_add(delta as u16);
        values.push(value);
    }

    Ok(values)
}

//! Triangle index unpacking.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;

/// Vertex counts above this use 32-bit indices.
pub const MAX_U16_INDEXED_VERTICES: usize = 64 * 1024;

/// On-wire width of triangle and edge indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Width used by a tile with `vertex_count` vertices.
    #[must_use]
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > MAX_U16_INDEXED_VERTICES {
            Self::U32
        } else {
            Self::U16
        }
    }

    /// Bytes per index.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

impl ByteReader<'_> {
    /// Read one index of the given width.
    pub fn read_index(&mut self, width: IndexWidth, context: &'static str) -> DecodeResult<u32> {
        match width {
            IndexWidth::U16 => self.read_u16(context).map(u32::from),
            IndexWidth::U32 => self.read_u32(context),
        }
    }
}

/// Decoder state for high-water-mark coded indices.
///
/// Each code `c` produces index `highest - c`. A zero code introduces a new
/// vertex and bumps `highest`. Codes must be fed in stream order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighWaterMark {
    highest: u32,
}

impl HighWaterMark {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next code, or `None` if it reaches below index zero.
    pub fn decode(&mut self, code: u32) -> Option<u32> {
        let index = self.highest.checked_sub(code)?;
        if code == 0 {
            self.highest += 1;
        }
        Some(index)
    }
}

/// Decode a whole sequence of high-water-mark codes.
pub fn decode_high_water_mark(codes: &[u32]) -> DecodeResult<Vec<u32>> {
    let mut state = HighWaterMark::new();
    codes
        .iter()
        .enumerate()
        .map(|(position, &code)| {
            state.decode(code).ok_or_else(|| invalid_code(position, code))
        })
        .collect()
}

fn invalid_code(position: usize, code: u32) -> DecodeError {
    DecodeError::InvalidFormat {
        context: "triangle indices",
        detail: format!("code {code} at position {position} exceeds the high-water mark"),
    }
}

/// Unpack the triangle section: optional alignment padding, a `u32` triangle
/// count, then `3 * count` high-water-mark coded indices.
///
/// Returns the decoded index list; triangle `t` is `indices[3t..3t + 3]`.
pub fn unpack_triangles(
    reader: &mut ByteReader<'_>,
    vertex_count: usize,
) -> DecodeResult<Vec<u32>> {
    let width = IndexWidth::for_vertex_count(vertex_count);
    // 32-bit index data starts on a 4-byte boundary.
    reader.align_to(width.size(), "triangle padding")?;

    let triangle_count = reader.read_count(3 * width.size(), "triangle count")?;
    let index_count = triangle_count * 3;

    let mut indices = Vec::with_capacity(index_count);
    let mut state = HighWaterMark::new();

    for position in 0..index_count {
        let code = reader.read_index(width, "triangle indices")?;
        let index = state.decode(code).ok_or_else(|| invalid_code(position, code))?;
        if index as usize >= vertex_count {
            return Err(DecodeError::IndexOutOfBounds {
                context: "triangle",
                index: index as usize,
                len: vertex_count,
            });
        }
        indices.push(index);
    }

    Ok(indices)
}

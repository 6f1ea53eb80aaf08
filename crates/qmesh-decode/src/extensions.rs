//! Trailing extension records.

use crate::error::DecodeResult;
use crate::reader::ByteReader;

/// Extension id for oct-encoded per-vertex normals.
pub const OCT_VERTEX_NORMALS: u8 = 1;
/// Extension id for the water mask.
pub const WATER_MASK: u8 = 2;
/// Extension id for JSON metadata.
pub const METADATA: u8 = 4;

/// Size of an extension record header (id + length).
const RECORD_HEADER_SIZE: usize = 5;

/// A raw extension record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub id: u8,
    pub data: Vec<u8>,
}

/// Extensions found after the edge indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    pub records: Vec<Extension>,
    /// Bytes at the end of the tile that did not form a complete record.
    pub trailing_bytes: usize,
}

impl Extensions {
    /// First record with the given id.
    #[must_use]
    pub fn find(&self, id: u8) -> Option<&Extension> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// Read extension records until the buffer is exhausted.
///
/// Each record is an id byte, a `u32` length and `length` bytes of data. A
/// fragment too short to hold the record it announces stops the scan and is
/// reported as trailing bytes instead of failing the tile.
pub fn unpack_extensions(reader: &mut ByteReader<'_>) -> DecodeResult<Extensions> {
    let mut extensions = Extensions::default();

    while reader.remaining() >= RECORD_HEADER_SIZE {
        let mut probe = reader.clone();
        let id = probe.read_u8("extension id")?;
        let length = probe.read_u32("extension length")? as usize;
        if probe.remaining() < length {
            break;
        }

        let data = probe.take(length, "extension data")?.to_vec();
        extensions.records.push(Extension { id, data });
        *reader = probe;
    }

    extensions.trailing_bytes = reader.remaining();
    reader.take(extensions.trailing_bytes, "extension trailer")?;
    Ok(extensions)
}

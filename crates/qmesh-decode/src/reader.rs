//! Little-endian byte cursor.

use crate::error::{DecodeError, DecodeResult};

/// A forward-only cursor over a tile buffer.
///
/// All multi-byte values in a quantized-mesh tile are little-endian. Every
/// read names the section it belongs to so that a short buffer reports where
/// decoding stopped.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Offset of the next unread byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail unless at least `needed` bytes remain.
    pub fn ensure(&self, needed: usize, context: &'static str) -> DecodeResult<()> {
        if self.remaining() < needed {
            return Err(DecodeError::UnexpectedEof {
                context,
                offset: self.offset,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Consume `len` bytes.
    pub fn take(&mut self, len: usize, context: &'static str) -> DecodeResult<&'a [u8]> {
        self.ensure(len, context)?;
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub fn read_u8(&mut self, context: &'static str) -> DecodeResult<u8> {
        Ok(self.array::<1>(context)?[0])
    }

    pub fn read_u16(&mut self, context: &'static str) -> DecodeResult<u16> {
        self.array(context).map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self, context: &'static str) -> DecodeResult<u32> {
        self.array(context).map(u32::from_le_bytes)
    }

    pub fn read_f32(&mut self, context: &'static str) -> DecodeResult<f32> {
        self.array(context).map(f32::from_le_bytes)
    }

    pub fn read_f64(&mut self, context: &'static str) -> DecodeResult<f64> {
        self.array(context).map(f64::from_le_bytes)
    }

    /// Read a `u32` element count and check that `count * element_size`
    /// bytes are still available, so a corrupt count cannot trigger a huge
    /// allocation.
    pub fn read_count(&mut self, element_size: usize, context: &'static str) -> DecodeResult<usize> {
        let count = self.read_u32(context)? as usize;
        let needed = count
            .checked_mul(element_size)
            .ok_or_else(|| DecodeError::InvalidFormat {
                context,
                detail: format!("count {count} overflows the buffer size"),
            })?;
        self.ensure(needed, context)?;
        Ok(count)
    }

    /// Skip padding up to the next multiple of `alignment` (relative to the
    /// start of the buffer).
    pub fn align_to(&mut self, alignment: usize, context: &'static str) -> DecodeResult<()> {
        let padding = (alignment - self.offset % alignment) % alignment;
        self.take(padding, context).map(|_| ())
    }
}

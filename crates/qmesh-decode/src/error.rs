//! Error types for decoding operations.

use thiserror::Error;

/// Errors that can occur while decoding a quantized-mesh tile.
///
/// Every variant is fatal for the tile being decoded: decoding stops at the
/// first error and no partially decoded data is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before a section was complete.
    #[error(
        "unexpected end of buffer in {context} at offset {offset}: needed {needed} bytes, {available} available"
    )]
    UnexpectedEof {
        /// Section being decoded.
        context: &'static str,
        /// Offset from the start of the tile.
        offset: usize,
        /// Bytes the section needed.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },
    /// Invalid data format or structure.
    #[error("invalid format in {context}: {detail}")]
    InvalidFormat {
        context: &'static str,
        detail: String,
    },
    /// A decoded index does not refer to an existing vertex.
    #[error("{context} index {index} out of bounds for {len} vertices")]
    IndexOutOfBounds {
        context: &'static str,
        index: usize,
        len: usize,
    },
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

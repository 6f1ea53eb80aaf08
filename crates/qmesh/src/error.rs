//! Error types for the qmesh crate.

use thiserror::Error;

/// Result type for qmesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in qmesh operations.
///
/// Query misses are not errors: they are reported as NaN elevations or a
/// partial bulk status.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The tile bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] qmesh_decode::DecodeError),
    /// The tile bytes could not be read.
    #[error("failed to read tile from {path}: {message}")]
    Io {
        /// Description of the tile source.
        path: String,
        /// The error message.
        message: String,
    },
    /// The tile cannot be used in its current state.
    #[error("illegal state: {reason}")]
    IllegalState { reason: String },
    /// A caller-supplied argument was invalid.
    #[error("invalid {context}: {detail}")]
    InvalidArgument {
        context: &'static str,
        detail: String,
    },
}

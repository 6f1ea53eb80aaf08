//! Sources of raw tile bytes.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Supplies the raw bytes of one tile.
pub trait TileSource: Send + Sync {
    /// Read the whole tile.
    fn read_bytes(&self) -> Result<Vec<u8>>;

    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;
}

/// A tile stored in a file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TileSource for FileSource {
    fn read_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| Error::Io {
            path: self.describe(),
            message: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A tile already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl TileSource for MemorySource {
    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("<memory, {} bytes>", self.bytes.len())
    }
}

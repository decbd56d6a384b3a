//! Tile cache interface and errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coord::TileIndex;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The tile has no cached data
    #[error("Tile {index} at zoom {zoom} is not cached")]
    NotCached { index: TileIndex, zoom: u8 },

    /// Reading or writing a cache file failed
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Local store of encoded tiles keyed by (tile index, zoom).
///
/// The download step only asks whether a tile already has data; fetching
/// policy (skip or force) is decided by the caller.
pub trait TileCache {
    /// Whether complete data for the tile is available.
    fn contains(&self, index: TileIndex, zoom: u8) -> bool;

    /// Reads the cached bytes of a tile.
    fn load(&self, index: TileIndex, zoom: u8) -> Result<Vec<u8>, CacheError>;

    /// Stores the bytes of a tile, replacing any previous data.
    fn store(&self, index: TileIndex, zoom: u8, bytes: &[u8]) -> Result<(), CacheError>;
}

/// Summary of the tiles held in a cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub tile_count: usize,
    pub total_bytes: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles, {:.2} MB",
            self.tile_count,
            self.total_bytes as f64 / (1024.0 * 1024.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_cached_display() {
        let err = CacheError::NotCached {
            index: TileIndex::new(5, 6),
            zoom: 15,
        };
        assert_eq!(err.to_string(), "Tile col=5 row=6 at zoom 15 is not cached");
    }

    #[test]
    fn test_stats_display() {
        let stats = CacheStats {
            tile_count: 12,
            total_bytes: 3 * 1024 * 1024,
        };
        assert_eq!(stats.to_string(), "12 tiles, 3.00 MB");
    }
}

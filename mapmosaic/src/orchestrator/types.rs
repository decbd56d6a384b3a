//! Orchestrator types and errors

use std::fmt;

use thiserror::Error;

use crate::area::{AreaError, RequiredArea};
use crate::cache::CacheError;
use crate::calibration::ScaleContext;
use crate::coord::{CoordError, TileIndex};
use crate::mosaic::MosaicError;
use crate::provider::ProviderError;
use crate::scale::ScaleError;
use crate::tile::EffectiveArea;

/// Errors that can occur while producing a map.
#[derive(Debug, Error)]
pub enum MapError {
    /// The requested area is invalid
    #[error("Invalid area: {0}")]
    Area(#[from] AreaError),

    /// A coordinate could not be projected onto the tile matrix
    #[error("Projection error: {0}")]
    Coord(#[from] CoordError),

    /// Downloading a tile failed
    #[error("Failed to fetch tile {index}: {source}")]
    Fetch {
        index: TileIndex,
        #[source]
        source: ProviderError,
    },

    /// Reading or writing the tile cache failed
    #[error("Tile cache error: {0}")]
    Cache(#[from] CacheError),

    /// Joining tiles into the mosaic failed
    #[error("Mosaic error: {0}")]
    Mosaic(#[from] MosaicError),

    /// Drawing the scale bar failed
    #[error("Scale bar error: {0}")]
    Scale(#[from] ScaleError),
}

/// Everything computed from an area request before any tile is fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPlan {
    /// Scale constants at the scale latitude of the request
    pub scale: ScaleContext,
    /// What was asked for
    pub required: RequiredArea,
    /// The tile-aligned area that will actually be downloaded
    pub effective: EffectiveArea,
}

impl MapPlan {
    /// Number of tiles the plan covers.
    pub fn tile_count(&self) -> u64 {
        self.effective.tiles.tile_count()
    }
}

impl fmt::Display for MapPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.required)?;
        write!(f, "{}", self.effective)
    }
}

/// What happened to one tile during the download step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// Downloaded and stored, with the encoded size in bytes
    Fetched(usize),
    /// Already cached and not forced
    Skipped,
}

/// Progress report emitted once per tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub index: TileIndex,
    pub outcome: TileOutcome,
    /// Tiles handled so far, this one included
    pub completed: u64,
    pub total: u64,
}

/// Statistics about a download step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Tiles downloaded from the provider
    pub fetched: u64,
    /// Tiles already present in the cache
    pub skipped: u64,
    /// Encoded bytes downloaded
    pub bytes: u64,
}

impl FetchStats {
    pub fn total(&self) -> u64 {
        self.fetched + self.skipped
    }
}

impl fmt::Display for FetchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles: {} downloaded ({:.2} MB), {} from cache",
            self.total(),
            self.fetched,
            self.bytes as f64 / (1024.0 * 1024.0),
            self.skipped
        )
    }
}

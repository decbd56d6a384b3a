//! Error types for mosaic assembly and persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coord::TileIndex;

/// Errors that can occur while assembling or saving a mosaic.
///
/// Every tile-level failure carries the offending [`TileIndex`] so the
/// failing request can be reproduced.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// Nothing to assemble
    #[error("No images to assemble")]
    NoImages,

    /// Tile image data is not available
    #[error("Tile {index} is missing: {reason}")]
    MissingTile { index: TileIndex, reason: String },

    /// Tile bytes could not be decoded as an image
    #[error("Tile {index} could not be decoded: {source}")]
    UnreadableTile {
        index: TileIndex,
        #[source]
        source: image::ImageError,
    },

    /// Tile dimensions differ from the rest of the grid
    #[error(
        "Tile {index} is {actual_width}x{actual_height} px, expected {expected_width}x{expected_height} px"
    )]
    MismatchedTile {
        index: TileIndex,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Combined dimensions overflow the raster size limits
    #[error("Mosaic dimensions overflow ({detail})")]
    TooLarge { detail: String },

    /// Encoding the mosaic failed
    #[error("Failed to encode mosaic: {0}")]
    Encode(#[from] image::ImageError),

    /// Writing the mosaic file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

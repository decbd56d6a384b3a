//! Provider types and traits

use std::fmt;

use crate::coord::TileIndex;

/// Errors that can occur while fetching tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Transport-level failure (connection, TLS, timeout, body read)
    HttpError(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// Zoom level differs from the one the provider is calibrated for
    UnsupportedZoom { requested: u8, supported: u8 },
    /// Response body is unusable
    InvalidResponse(String),
    /// Provider or client settings are invalid
    InvalidConfig(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::UnsupportedZoom {
                requested,
                supported,
            } => write!(
                f,
                "Zoom level {} not supported by provider (only {})",
                requested, supported
            ),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::InvalidConfig(msg) => write!(f, "Invalid provider configuration: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of raw tile images.
///
/// Implementors fetch one encoded tile (typically JPEG) per call. Retries,
/// if any, are the implementor's business.
pub trait Provider {
    /// Fetches the encoded image of one tile.
    ///
    /// # Arguments
    ///
    /// * `index` - Column and row in the tile matrix
    /// * `zoom` - Zoom level of the tile matrix
    fn fetch_tile(&self, index: TileIndex, zoom: u8) -> Result<Vec<u8>, ProviderError>;

    /// Short name used in cache and output file names.
    fn name(&self) -> &str;

    /// The single zoom level this provider serves.
    fn zoom(&self) -> u8;
}

impl<P: Provider + ?Sized> Provider for &P {
    fn fetch_tile(&self, index: TileIndex, zoom: u8) -> Result<Vec<u8>, ProviderError> {
        (**self).fetch_tile(index, zoom)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn zoom(&self) -> u8 {
        (**self).zoom()
    }
}

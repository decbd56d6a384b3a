//! Coordinate type definitions

use std::fmt;

/// Latitude domain bounds (exclusive): Web Mercator diverges at the poles.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Geographic point in decimal degrees.
///
/// Longitude is unconstrained (no wraparound handling); latitude must stay
/// strictly inside (-90, 90) to be projectable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees, positive east
    pub lon: f64,
    /// Latitude in degrees, positive north
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lon {:.5}, lat {:.5})", self.lon, self.lat)
    }
}

/// Web Mercator (EPSG:3857) planar coordinates in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    /// Easting in meters
    pub x: f64,
    /// Northing in meters
    pub y: f64,
}

/// Address of one square tile in the tile matrix.
///
/// Columns grow eastward and rows grow southward from the matrix top-left
/// corner, so row 0 is the northernmost row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
}

impl TileIndex {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col={} row={}", self.col, self.row)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is at or beyond a pole, or not a number
    InvalidLatitude(f64),
    /// Longitude is not a finite number
    InvalidLongitude(f64),
    /// Zoom level differs from the calibrated one
    UnsupportedZoom { requested: u8, calibrated: u8 },
    /// The point projects outside the tile matrix (raw fractional indices)
    OutsideTileMatrix { col: f64, row: f64 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be strictly between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(f, "Invalid longitude: {} (must be a finite number)", lon)
            }
            CoordError::UnsupportedZoom {
                requested,
                calibrated,
            } => {
                write!(
                    f,
                    "Zoom level {} is not supported (calibrated for zoom {})",
                    requested, calibrated
                )
            }
            CoordError::OutsideTileMatrix { col, row } => {
                write!(
                    f,
                    "Tile position (col {:.3}, row {:.3}) lies outside the tile matrix",
                    col, row
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}

//! Area request and bounding box types

use std::fmt;

use crate::coord::{CoordError, GeoPoint};

/// Default paper width in centimeters (A4 portrait).
pub const DEFAULT_PAPER_WIDTH_CM: f64 = 21.0;

/// Default paper height in centimeters (A4 portrait).
pub const DEFAULT_PAPER_HEIGHT_CM: f64 = 29.7;

/// How the extent along one axis is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisRequest {
    /// Center the axis on the input coordinate and cover `size_cm` of paper.
    Centered { size_cm: f64 },
    /// Span from the input coordinate to `to` (any order).
    Between { to: f64 },
}

/// User request for a map area.
///
/// The center coordinate doubles as one end of an axis when that axis is
/// requested with [`AxisRequest::Between`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRequest {
    pub center: GeoPoint,
    pub width: AxisRequest,
    pub height: AxisRequest,
}

impl AreaRequest {
    /// Request a `width_cm` × `height_cm` sheet centered on `center`.
    pub fn centered(center: GeoPoint, width_cm: f64, height_cm: f64) -> Self {
        Self {
            center,
            width: AxisRequest::Centered { size_cm: width_cm },
            height: AxisRequest::Centered {
                size_cm: height_cm,
            },
        }
    }

    /// Request an A4 portrait sheet centered on `center`.
    pub fn a4(center: GeoPoint) -> Self {
        Self::centered(center, DEFAULT_PAPER_WIDTH_CM, DEFAULT_PAPER_HEIGHT_CM)
    }

    /// Span longitudes from the center longitude to `to_lon`.
    pub fn with_to_lon(mut self, to_lon: f64) -> Self {
        self.width = AxisRequest::Between { to: to_lon };
        self
    }

    /// Span latitudes from the center latitude to `to_lat`.
    pub fn with_to_lat(mut self, to_lat: f64) -> Self {
        self.height = AxisRequest::Between { to: to_lat };
        self
    }

    /// Latitude at which the scale context is evaluated.
    ///
    /// This is the center latitude, or the midpoint of the explicit latitude
    /// pair when the height is requested by coordinates.
    pub fn scale_latitude(&self) -> f64 {
        match self.height {
            AxisRequest::Centered { .. } => self.center.lat,
            AxisRequest::Between { to } => (self.center.lat + to) / 2.0,
        }
    }
}

/// Closed interval along one axis with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    start: f64,
    end: f64,
}

impl AxisRange {
    /// Build a range from two endpoints given in any order.
    pub fn normalized(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Geographic bounding box (degrees), normalized on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    pub lon: AxisRange,
    pub lat: AxisRange,
}

impl GeoBoundingBox {
    pub fn new(lon: AxisRange, lat: AxisRange) -> Self {
        Self { lon, lat }
    }

    /// South-west corner (minimum longitude and latitude).
    pub fn start_corner(&self) -> GeoPoint {
        GeoPoint::new(self.lon.start(), self.lat.start())
    }

    /// North-east corner (maximum longitude and latitude).
    pub fn end_corner(&self) -> GeoPoint {
        GeoPoint::new(self.lon.end(), self.lat.end())
    }
}

/// Physical paper dimensions in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub width_cm: f64,
    pub height_cm: f64,
}

/// Ground dimensions in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSize {
    pub width_m: f64,
    pub height_m: f64,
}

/// The area the user asked for, before rounding to whole tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequiredArea {
    pub bbox: GeoBoundingBox,
    pub paper: PaperSize,
    pub terrain: TerrainSize,
    /// Rendered pixels needed on each axis (fractional)
    pub width_px: f64,
    pub height_px: f64,
}

impl fmt::Display for RequiredArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Asked to download:")?;
        writeln!(
            f,
            " longitude from {:>9.5} to {:<10.5} <-> paper width  {:>4.1} cm <-> {:>5.0} px <-> terrain width  {:>5.0} m <-> {:>9.5} degrees",
            self.bbox.lon.start(),
            self.bbox.lon.end(),
            self.paper.width_cm,
            self.width_px,
            self.terrain.width_m,
            self.bbox.lon.span()
        )?;
        write!(
            f,
            " latitude  from {:>9.5} to {:<10.5} <-> paper height {:>4.1} cm <-> {:>5.0} px <-> terrain height {:>5.0} m <-> {:>9.5} degrees",
            self.bbox.lat.start(),
            self.bbox.lat.end(),
            self.paper.height_cm,
            self.height_px,
            self.terrain.height_m,
            self.bbox.lat.span()
        )
    }
}

/// Which axis an input error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Longitude,
    Latitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Longitude => write!(f, "longitude"),
            Axis::Latitude => write!(f, "latitude"),
        }
    }
}

/// Errors that can occur while resolving an area request.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaError {
    /// Requested paper size is zero, negative or not a number
    InvalidPaperSize { axis: Axis, size_cm: f64 },
    /// A requested coordinate is not a finite number
    InvalidCoordinate { axis: Axis, value: f64 },
    /// The resolved area cannot be projected
    Projection(CoordError),
}

impl fmt::Display for AreaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaError::InvalidPaperSize { axis, size_cm } => write!(
                f,
                "Invalid paper size along {}: {} cm (must be greater than zero)",
                axis, size_cm
            ),
            AreaError::InvalidCoordinate { axis, value } => {
                write!(f, "Invalid {} coordinate: {}", axis, value)
            }
            AreaError::Projection(e) => write!(f, "Projection error: {}", e),
        }
    }
}

impl std::error::Error for AreaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AreaError::Projection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CoordError> for AreaError {
    fn from(e: CoordError) -> Self {
        AreaError::Projection(e)
    }
}

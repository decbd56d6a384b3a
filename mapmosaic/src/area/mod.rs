//! Area resolution
//!
//! Turns an [`AreaRequest`] into the geographic bounding box the map has to
//! cover, together with the paper and ground dimensions of that box.
//!
//! Longitude and latitude are resolved independently. A degree of longitude
//! covers `cos(latitude)` times less ground than a degree of latitude, while
//! the paper scale itself also shrinks by `cos(latitude)` under Web Mercator,
//! so a centimeter of paper always spans the same number of longitude degrees
//! at a given zoom but a latitude-dependent number of latitude degrees.

mod types;

pub use types::{
    AreaError, AreaRequest, Axis, AxisRange, AxisRequest, GeoBoundingBox, PaperSize,
    RequiredArea, TerrainSize, DEFAULT_PAPER_HEIGHT_CM, DEFAULT_PAPER_WIDTH_CM,
};

use tracing::debug;

use crate::calibration::{Calibration, ScaleContext};
use crate::coord::{CoordError, MAX_LAT, MIN_LAT};

/// Resolved extent of one axis.
struct AxisResolution {
    range: AxisRange,
    paper_cm: f64,
    terrain_m: f64,
}

/// Resolves the required bounding box and physical size of a request.
///
/// Per axis:
///
/// 1. With explicit coordinates, the range is the ordered pair and the paper
///    size follows from the ground span and the real scale denominator.
/// 2. Otherwise the ground span follows from the paper size and is centered
///    on the input coordinate.
///
/// Equal explicit coordinates yield a zero-width range, which the tile grid
/// widens to a single tile. A non-positive paper size is rejected.
pub fn resolve_area(
    request: &AreaRequest,
    scale: &ScaleContext,
    calibration: &Calibration,
) -> Result<RequiredArea, AreaError> {
    let center = request.center;
    if !center.lon.is_finite() {
        return Err(AreaError::InvalidCoordinate {
            axis: Axis::Longitude,
            value: center.lon,
        });
    }
    if !center.lat.is_finite() {
        return Err(AreaError::InvalidCoordinate {
            axis: Axis::Latitude,
            value: center.lat,
        });
    }

    // Ground meters per degree along a parallel and along a meridian
    let meters_per_degree = calibration.meters_per_degree();
    let lon_meters_per_degree = meters_per_degree * scale.latitude_deg().to_radians().cos();

    let width = resolve_axis(
        Axis::Longitude,
        center.lon,
        request.width,
        lon_meters_per_degree,
        scale,
    )?;
    let height = resolve_axis(
        Axis::Latitude,
        center.lat,
        request.height,
        meters_per_degree,
        scale,
    )?;

    if height.range.start() <= MIN_LAT {
        return Err(CoordError::InvalidLatitude(height.range.start()).into());
    }
    if height.range.end() >= MAX_LAT {
        return Err(CoordError::InvalidLatitude(height.range.end()).into());
    }

    let area = RequiredArea {
        bbox: GeoBoundingBox::new(width.range, height.range),
        paper: PaperSize {
            width_cm: width.paper_cm,
            height_cm: height.paper_cm,
        },
        terrain: TerrainSize {
            width_m: width.terrain_m,
            height_m: height.terrain_m,
        },
        width_px: scale.terrain_m_to_pixels(width.terrain_m),
        height_px: scale.terrain_m_to_pixels(height.terrain_m),
    };

    debug!(
        lon_start = area.bbox.lon.start(),
        lon_end = area.bbox.lon.end(),
        lat_start = area.bbox.lat.start(),
        lat_end = area.bbox.lat.end(),
        paper_width_cm = area.paper.width_cm,
        paper_height_cm = area.paper.height_cm,
        "Resolved required area"
    );

    Ok(area)
}

fn resolve_axis(
    axis: Axis,
    origin: f64,
    request: AxisRequest,
    meters_per_degree: f64,
    scale: &ScaleContext,
) -> Result<AxisResolution, AreaError> {
    match request {
        AxisRequest::Between { to } => {
            if !to.is_finite() {
                return Err(AreaError::InvalidCoordinate { axis, value: to });
            }
            let range = AxisRange::normalized(origin, to);
            let terrain_m = range.span() * meters_per_degree;
            Ok(AxisResolution {
                range,
                paper_cm: scale.terrain_m_to_paper_cm(terrain_m),
                terrain_m,
            })
        }
        AxisRequest::Centered { size_cm } => {
            if !size_cm.is_finite() || size_cm <= 0.0 {
                return Err(AreaError::InvalidPaperSize { axis, size_cm });
            }
            let terrain_m = scale.paper_cm_to_terrain_m(size_cm);
            let half_span_deg = terrain_m / meters_per_degree / 2.0;
            Ok(AxisResolution {
                range: AxisRange::normalized(origin - half_span_deg, origin + half_span_deg),
                paper_cm: size_cm,
                terrain_m,
            })
        }
    }
}

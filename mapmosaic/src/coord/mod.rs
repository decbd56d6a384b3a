//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (longitude/latitude),
//! Web Mercator planar meters and tile matrix indices at the calibrated zoom.
//!
//! Two routes lead from degrees to a [`TileIndex`]:
//!
//! - [`geo_to_planar`] followed by [`planar_to_tile_index`], which shifts the
//!   planar point to the matrix top-left corner and divides by the tile size
//!   in meters. This is the route that honours the service's declared corner.
//! - [`geo_to_tile_index`], the closed-form slippy-map formula. It ignores the
//!   declared corner and tile size, so near tile boundaries the two routes
//!   may disagree by one index.

mod types;

pub use types::{CoordError, GeoPoint, PlanarPoint, TileIndex, MAX_LAT, MIN_LAT};

use std::f64::consts::PI;

use crate::calibration::Calibration;

/// Projects geographic coordinates to Web Mercator meters.
///
/// `x = R·λ`, `y = R·ln(tan(φ/2 + π/4))` with `R` the calibration's
/// equatorial radius. `y` diverges at the poles, so latitudes at or beyond
/// ±90° are rejected.
#[inline]
pub fn geo_to_planar(point: GeoPoint, calibration: &Calibration) -> Result<PlanarPoint, CoordError> {
    validate(point)?;

    let radius = calibration.earth_radius_m();
    let lon_rad = point.lon.to_radians();
    let lat_rad = point.lat.to_radians();

    Ok(PlanarPoint {
        x: radius * lon_rad,
        y: radius * (lat_rad / 2.0 + PI / 4.0).tan().ln(),
    })
}

/// Inverse of [`geo_to_planar`].
#[inline]
pub fn planar_to_geo(point: PlanarPoint, calibration: &Calibration) -> GeoPoint {
    let radius = calibration.earth_radius_m();
    let lon = (point.x / radius).to_degrees();
    let lat = (2.0 * (point.y / radius).exp().atan() - PI / 2.0).to_degrees();
    GeoPoint { lon, lat }
}

/// Converts Web Mercator meters to a tile index.
///
/// The point is shifted so the matrix top-left corner sits at the origin,
/// with the y axis inverted (the corner has the largest northing but row 0),
/// then divided by the tile edge length in meters. The quotient is truncated,
/// so a point exactly on a tile boundary belongs to the tile to its
/// south-east.
pub fn planar_to_tile_index(
    point: PlanarPoint,
    zoom: u8,
    calibration: &Calibration,
) -> Result<TileIndex, CoordError> {
    check_zoom(zoom, calibration)?;

    let (x0, y0) = calibration.top_left_corner();
    let tile_size = calibration.tile_size_planar_meters();

    let col = (point.x - x0) / tile_size;
    let row = (y0 - point.y) / tile_size;

    index_from_fraction(col, row, calibration)
}

/// Converts geographic coordinates directly to a tile index.
///
/// Uses the closed-form slippy-map formula for a `2^zoom` matrix. Agrees
/// with the planar route to within one index.
pub fn geo_to_tile_index(
    point: GeoPoint,
    zoom: u8,
    calibration: &Calibration,
) -> Result<TileIndex, CoordError> {
    validate(point)?;
    check_zoom(zoom, calibration)?;

    let n = 2.0_f64.powi(zoom as i32);
    let lat_rad = point.lat.to_radians();

    let col = (point.lon + 180.0) / 360.0 * n;
    let row = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    index_from_fraction(col, row, calibration)
}

/// Returns the geographic coordinates of a tile's north-west corner.
#[inline]
pub fn tile_to_geo(index: TileIndex, calibration: &Calibration) -> GeoPoint {
    let (x0, y0) = calibration.top_left_corner();
    let tile_size = calibration.tile_size_planar_meters();

    planar_to_geo(
        PlanarPoint {
            x: x0 + index.col as f64 * tile_size,
            y: y0 - index.row as f64 * tile_size,
        },
        calibration,
    )
}

/// Ground distance covered by one tile edge at `latitude`.
///
/// Combines the rendering pixel pitch, the declared scale denominator, the
/// tile edge in pixels and the cosine correction from the calibration's
/// reference latitude to `latitude`.
pub fn tile_size_in_terrain_meters(
    calibration: &Calibration,
    zoom: u8,
    latitude: f64,
) -> Result<f64, CoordError> {
    check_zoom(zoom, calibration)?;
    Ok(calibration.scale_context(latitude)?.terrain_meters_per_tile())
}

fn validate(point: GeoPoint) -> Result<(), CoordError> {
    if !point.lat.is_finite() || point.lat <= MIN_LAT || point.lat >= MAX_LAT {
        return Err(CoordError::InvalidLatitude(point.lat));
    }
    if !point.lon.is_finite() {
        return Err(CoordError::InvalidLongitude(point.lon));
    }
    Ok(())
}

fn check_zoom(zoom: u8, calibration: &Calibration) -> Result<(), CoordError> {
    if zoom != calibration.zoom() {
        return Err(CoordError::UnsupportedZoom {
            requested: zoom,
            calibrated: calibration.zoom(),
        });
    }
    Ok(())
}

fn index_from_fraction(
    col: f64,
    row: f64,
    calibration: &Calibration,
) -> Result<TileIndex, CoordError> {
    let (width, height) = calibration.matrix_size();
    let outside = !col.is_finite()
        || !row.is_finite()
        || col < 0.0
        || row < 0.0
        || col.trunc() >= width as f64
        || row.trunc() >= height as f64;

    if outside {
        return Err(CoordError::OutsideTileMatrix { col, row });
    }

    Ok(TileIndex {
        col: col.trunc() as u32,
        row: row.trunc() as u32,
    })
}

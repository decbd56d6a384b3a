//! Tile grid
//!
//! Maps a required geographic bounding box onto the tile matrix. The
//! resulting [`TileBoundingBox`] is inclusive of both corner tiles, so the
//! effective map is always a whole number of tiles and usually somewhat
//! larger than what was asked for. [`EffectiveArea`] reports that larger
//! extent in paper, pixel and ground units.

mod grid;
mod naming;

pub use grid::{TileBoundingBox, TileGridIter, TileRange};
pub use naming::{map_file_name, tile_file_name, JPEG_EXTENSION};

use std::fmt;

use tracing::debug;

use crate::area::{AxisRange, GeoBoundingBox, PaperSize, TerrainSize};
use crate::calibration::{Calibration, ScaleContext};
use crate::coord::{self, CoordError, TileIndex};

/// The tile block that will actually be downloaded and its physical size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveArea {
    pub tiles: TileBoundingBox,
    /// Geographic extent from the north-west corner of the first tile to the
    /// south-east corner of the last one
    pub bbox: GeoBoundingBox,
    pub paper: PaperSize,
    pub terrain: TerrainSize,
    /// Mosaic dimensions in pixels
    pub width_px: u64,
    pub height_px: u64,
}

impl fmt::Display for EffectiveArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self.tiles.cols();
        let rows = self.tiles.rows();

        writeln!(f, "Actually downloading:")?;
        writeln!(
            f,
            " {:>4} cols from {:>9} to {:<10} <-> paper width  {:>4.1} cm <-> {:>5} px <-> terrain width  {:>5.0} m <-> {:>9.5} degrees",
            cols.count(),
            cols.start(),
            cols.end(),
            self.paper.width_cm,
            self.width_px,
            self.terrain.width_m,
            self.bbox.lon.span()
        )?;
        write!(
            f,
            " {:>4} rows from {:>9} to {:<10} <-> paper height {:>4.1} cm <-> {:>5} px <-> terrain height {:>5.0} m <-> {:>9.5} degrees",
            rows.count(),
            rows.start(),
            rows.end(),
            self.paper.height_cm,
            self.height_px,
            self.terrain.height_m,
            self.bbox.lat.span()
        )
    }
}

/// Computes the inclusive tile block covering `required`.
///
/// Both corners are projected to tile indices through the planar route and
/// the block is normalized afterwards, since row numbers grow southward
/// while latitudes grow northward. Physical sizes are recomputed from the
/// tile counts rather than from the requested span.
///
/// # Errors
///
/// Returns [`CoordError`] when a corner cannot be projected or falls outside
/// the tile matrix.
pub fn compute_effective_bounding_box(
    required: &GeoBoundingBox,
    scale: &ScaleContext,
    calibration: &Calibration,
) -> Result<EffectiveArea, CoordError> {
    let zoom = calibration.zoom();
    let start = project(required.start_corner(), zoom, calibration)?;
    let end = project(required.end_corner(), zoom, calibration)?;
    let tiles = TileBoundingBox::from_corners(start, end);

    let cols = tiles.cols().count() as f64;
    let rows = tiles.rows().count() as f64;
    let tile_px = calibration.tile_size_px() as f64;

    let north_west = coord::tile_to_geo(tiles.first(), calibration);
    let south_east = coord::tile_to_geo(
        TileIndex::new(tiles.last().col + 1, tiles.last().row + 1),
        calibration,
    );

    let effective = EffectiveArea {
        tiles,
        bbox: GeoBoundingBox::new(
            AxisRange::normalized(north_west.lon, south_east.lon),
            AxisRange::normalized(north_west.lat, south_east.lat),
        ),
        paper: PaperSize {
            width_cm: scale.pixels_to_paper_cm(cols * tile_px),
            height_cm: scale.pixels_to_paper_cm(rows * tile_px),
        },
        terrain: TerrainSize {
            width_m: cols * scale.terrain_meters_per_tile(),
            height_m: rows * scale.terrain_meters_per_tile(),
        },
        width_px: tiles.cols().count() as u64 * calibration.tile_size_px() as u64,
        height_px: tiles.rows().count() as u64 * calibration.tile_size_px() as u64,
    };

    debug!(
        cols = %tiles.cols(),
        rows = %tiles.rows(),
        tile_count = tiles.tile_count(),
        "Computed effective tile box"
    );

    Ok(effective)
}

fn project(
    point: coord::GeoPoint,
    zoom: u8,
    calibration: &Calibration,
) -> Result<TileIndex, CoordError> {
    let planar = coord::geo_to_planar(point, calibration)?;
    coord::planar_to_tile_index(planar, zoom, calibration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{resolve_area, AreaRequest, RequiredArea};
    use crate::coord::GeoPoint;

    fn plan(request: AreaRequest) -> (RequiredArea, EffectiveArea) {
        let calibration = Calibration::default();
        let scale = calibration.scale_context(request.scale_latitude()).unwrap();
        let required = resolve_area(&request, &scale, &calibration).unwrap();
        let effective =
            compute_effective_bounding_box(&required.bbox, &scale, &calibration).unwrap();
        (required, effective)
    }

    #[test]
    fn test_chamechaude_a4_covers_request() {
        let (required, effective) = plan(AreaRequest::a4(GeoPoint::new(5.78868, 45.28787)));

        assert!(effective.tiles.contains(TileIndex::new(16910, 11750)));
        assert!(effective.terrain.width_m >= required.terrain.width_m);
        assert!(effective.terrain.height_m >= required.terrain.height_m);
        assert!(effective.paper.width_cm >= required.paper.width_cm);
        assert!(effective.paper.height_cm >= required.paper.height_cm);
    }

    #[test]
    fn test_effective_pixels_are_whole_tiles() {
        let (_, effective) = plan(AreaRequest::a4(GeoPoint::new(5.78868, 45.28787)));

        assert_eq!(effective.width_px, effective.tiles.cols().count() as u64 * 256);
        assert_eq!(effective.height_px, effective.tiles.rows().count() as u64 * 256);
        // 256 px at 0.028 cm per pixel
        let expected_cm = effective.tiles.cols().count() as f64 * 7.168;
        assert!((effective.paper.width_cm - expected_cm).abs() < 1e-9);
    }

    #[test]
    fn test_effective_extent_contains_required_box() {
        let (required, effective) = plan(AreaRequest::a4(GeoPoint::new(2.3522, 48.8566)));

        assert!(effective.bbox.lon.start() <= required.bbox.lon.start());
        assert!(effective.bbox.lon.end() >= required.bbox.lon.end());
        assert!(effective.bbox.lat.start() <= required.bbox.lat.start());
        assert!(effective.bbox.lat.end() >= required.bbox.lat.end());
    }

    #[test]
    fn test_degenerate_longitude_yields_single_column() {
        let request = AreaRequest::a4(GeoPoint::new(5.78868, 45.28787)).with_to_lon(5.78868);
        let (_, effective) = plan(request);

        assert_eq!(effective.tiles.cols().count(), 1);
        assert_eq!(effective.tiles.cols().start(), 16910);
        assert!(effective.tiles.rows().count() >= 1);
    }

    #[test]
    fn test_degenerate_point_yields_one_tile() {
        let request = AreaRequest::a4(GeoPoint::new(-74.006, 40.7128))
            .with_to_lon(-74.006)
            .with_to_lat(40.7128);
        let (_, effective) = plan(request);

        assert_eq!(effective.tiles.tile_count(), 1);
        assert_eq!(effective.tiles.first(), TileIndex::new(9647, 12320));
    }

    #[test]
    fn test_rows_are_normalized_against_latitude() {
        // The south-west corner lands on the larger row number
        let request = AreaRequest::a4(GeoPoint::new(5.7, 45.2))
            .with_to_lon(5.9)
            .with_to_lat(45.4);
        let (_, effective) = plan(request);

        let rows = effective.tiles.rows();
        assert!(rows.start() < rows.end());
        assert!(effective.tiles.cols().start() < effective.tiles.cols().end());
    }

    #[test]
    fn test_display_reports_tile_ranges() {
        let (_, effective) = plan(AreaRequest::a4(GeoPoint::new(5.78868, 45.28787)));
        let report = effective.to_string();

        assert!(report.starts_with("Actually downloading:"));
        assert!(report.contains(&format!(
            "cols from {:>9}",
            effective.tiles.cols().start()
        )));
        assert!(report.contains(&format!("rows from {:>9}", effective.tiles.rows().start())));
    }

    #[test]
    fn test_corner_outside_matrix_is_rejected() {
        let calibration = Calibration::default();
        let scale = calibration.scale_context(0.0).unwrap();
        let bbox = GeoBoundingBox::new(
            AxisRange::normalized(179.0, 181.0),
            AxisRange::normalized(-1.0, 1.0),
        );
        let result = compute_effective_bounding_box(&bbox, &scale, &calibration);
        assert!(matches!(result, Err(CoordError::OutsideTileMatrix { .. })));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_counts_never_zero(
                lon in -170.0..170.0_f64,
                lat in -70.0..70.0_f64,
                dlon in -0.5..0.5_f64,
                dlat in -0.5..0.5_f64
            ) {
                let request = AreaRequest::a4(GeoPoint::new(lon, lat))
                    .with_to_lon(lon + dlon)
                    .with_to_lat(lat + dlat);
                let (_, effective) = plan(request);

                let cols = effective.tiles.cols();
                let rows = effective.tiles.rows();
                prop_assert!(cols.start() <= cols.end());
                prop_assert!(rows.start() <= rows.end());
                prop_assert_eq!(cols.count(), cols.end() - cols.start() + 1);
                prop_assert!(cols.count() >= 1 && rows.count() >= 1);
            }
        }
    }
}

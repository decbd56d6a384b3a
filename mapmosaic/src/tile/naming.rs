//! Deterministic file names for cached tiles and finished maps.

use super::TileBoundingBox;
use crate::coord::TileIndex;

/// Extension shared by every file this crate writes.
pub const JPEG_EXTENSION: &str = "jpeg";

/// File name of one cached tile.
///
/// # Example
///
/// ```
/// use mapmosaic::coord::TileIndex;
/// use mapmosaic::tile::tile_file_name;
///
/// let name = tile_file_name("geoportail", 15, TileIndex::new(16910, 11750));
/// assert_eq!(name, "geoportail_zoom15_row11750_col16910.jpeg");
/// ```
pub fn tile_file_name(map_name: &str, zoom: u8, index: TileIndex) -> String {
    format!(
        "{}_zoom{}_row{}_col{}.{}",
        map_name, zoom, index.row, index.col, JPEG_EXTENSION
    )
}

/// File name of an assembled map covering `bbox`.
pub fn map_file_name(map_name: &str, zoom: u8, bbox: &TileBoundingBox) -> String {
    format!(
        "{}_zoom{}_rows{}_cols{}.{}",
        map_name,
        zoom,
        bbox.rows(),
        bbox.cols(),
        JPEG_EXTENSION
    )
}

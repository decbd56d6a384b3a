//! Mosaic assembly
//!
//! Joins a rectangular grid of tile rasters into one image. Tiles of a row
//! are concatenated left to right, then rows are concatenated top to bottom.
//! A pixel at `(x, y)` inside the tile at grid position `(col, row)` lands at
//! `(x + Σ widths of columns before col, y + Σ heights of rows before row)`.
//!
//! The concatenation itself does not assume uniform tile sizes: a strip is as
//! long as the sum of its parts and as thick as its thickest part, and
//! uncovered pixels stay black. [`MosaicAssembler`] can additionally enforce
//! one expected tile size and reject any tile that differs.

mod error;

pub use error::MosaicError;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use tracing::{debug, info};

use crate::coord::TileIndex;
use crate::tile::TileBoundingBox;

/// Decoded raster of one tile.
pub type TileImage = RgbImage;

/// Default JPEG quality used when persisting a mosaic.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// The assembled map raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Mosaic {
    image: RgbImage,
}

impl Mosaic {
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Mutable access to the pixel buffer, used for annotation.
    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Encodes the mosaic as JPEG into `writer`.
    pub fn write_jpeg<W: Write>(&self, writer: W, quality: u8) -> Result<(), MosaicError> {
        let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
        self.image.write_with_encoder(encoder)?;
        Ok(())
    }

    /// Encodes the mosaic as JPEG and writes it to `path`.
    pub fn save_jpeg(&self, path: &Path, quality: u8) -> Result<(), MosaicError> {
        let write_error = |source| MosaicError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        self.write_jpeg(&mut writer, quality)?;
        writer.flush().map_err(write_error)?;

        info!(
            path = %path.display(),
            width = self.width(),
            height = self.height(),
            "Saved mosaic"
        );
        Ok(())
    }
}

/// Decodes raw tile bytes (any format the image codecs enabled here know).
pub fn decode_tile(index: TileIndex, bytes: &[u8]) -> Result<TileImage, MosaicError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|source| MosaicError::UnreadableTile { index, source })?;
    Ok(decoded.to_rgb8())
}

/// Concatenates images left to right.
///
/// The strip is as wide as the sum of the widths and as tall as the tallest
/// image. Each image is pasted at its cumulative x offset, at y = 0.
pub fn assemble_row(tiles: &[TileImage]) -> Result<RgbImage, MosaicError> {
    if tiles.is_empty() {
        return Err(MosaicError::NoImages);
    }

    let width = checked_sum(tiles.iter().map(|t| t.width()), "row width")?;
    let height = tiles.iter().map(|t| t.height()).max().unwrap_or(0);

    let mut canvas = RgbImage::new(width, height);
    let mut x_offset: u32 = 0;
    for tile in tiles {
        imageops::replace(&mut canvas, tile, x_offset as i64, 0);
        x_offset += tile.width();
    }

    Ok(canvas)
}

/// Concatenates row images top to bottom.
///
/// Same algorithm as [`assemble_row`], transposed.
pub fn assemble_columns(rows: &[RgbImage]) -> Result<RgbImage, MosaicError> {
    if rows.is_empty() {
        return Err(MosaicError::NoImages);
    }

    let width = rows.iter().map(|r| r.width()).max().unwrap_or(0);
    let height = checked_sum(rows.iter().map(|r| r.height()), "column height")?;

    let mut canvas = RgbImage::new(width, height);
    let mut y_offset: u32 = 0;
    for row in rows {
        imageops::replace(&mut canvas, row, 0, y_offset as i64);
        y_offset += row.height();
    }

    Ok(canvas)
}

fn checked_sum(mut values: impl Iterator<Item = u32>, what: &str) -> Result<u32, MosaicError> {
    values
        .try_fold(0u32, |acc, v| acc.checked_add(v))
        .ok_or_else(|| MosaicError::TooLarge {
            detail: format!("{} exceeds {} px", what, u32::MAX),
        })
}

/// Builds a [`Mosaic`] from every tile of a [`TileBoundingBox`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MosaicAssembler {
    expected_tile_size: Option<(u32, u32)>,
}

impl MosaicAssembler {
    /// Assembler accepting tiles of any size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler rejecting any tile that is not `width` × `height` pixels.
    pub fn with_expected_tile_size(width: u32, height: u32) -> Self {
        Self {
            expected_tile_size: Some((width, height)),
        }
    }

    pub fn expected_tile_size(&self) -> Option<(u32, u32)> {
        self.expected_tile_size
    }

    /// Loads and joins every tile of `tiles`.
    ///
    /// Rows are assembled in increasing row order and, within a row, tiles
    /// in increasing column order. The first tile that cannot be loaded or
    /// has the wrong size aborts the whole mosaic.
    ///
    /// # Arguments
    ///
    /// * `tiles` - Inclusive tile block to assemble
    /// * `load` - Produces the decoded raster of one tile
    pub fn assemble<F>(&self, tiles: &TileBoundingBox, mut load: F) -> Result<Mosaic, MosaicError>
    where
        F: FnMut(TileIndex) -> Result<TileImage, MosaicError>,
    {
        let mut row_images = Vec::with_capacity(tiles.rows().count() as usize);

        for row in tiles.rows().iter() {
            let mut row_tiles = Vec::with_capacity(tiles.cols().count() as usize);
            for col in tiles.cols().iter() {
                let index = TileIndex::new(col, row);
                let tile = load(index)?;
                self.check_size(index, &tile)?;
                row_tiles.push(tile);
            }

            let row_image = assemble_row(&row_tiles)?;
            debug!(
                row,
                width = row_image.width(),
                height = row_image.height(),
                "Assembled row"
            );
            row_images.push(row_image);
        }

        let image = assemble_columns(&row_images)?;
        info!(
            width = image.width(),
            height = image.height(),
            tiles = tiles.tile_count(),
            "Assembled mosaic"
        );

        Ok(Mosaic::from_image(image))
    }

    fn check_size(&self, index: TileIndex, tile: &TileImage) -> Result<(), MosaicError> {
        match self.expected_tile_size {
            Some((width, height)) if tile.dimensions() != (width, height) => {
                Err(MosaicError::MismatchedTile {
                    index,
                    expected_width: width,
                    expected_height: height,
                    actual_width: tile.width(),
                    actual_height: tile.height(),
                })
            }
            _ => Ok(()),
        }
    }
}

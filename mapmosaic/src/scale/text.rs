//! Text rendering collaborators for scale bar labels.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Default label height in pixels.
pub const DEFAULT_FONT_SIZE_PX: f32 = 24.0;

/// Draws text onto a raster.
///
/// The scale bar only computes strings and anchor positions; glyph
/// rasterization is left to implementors.
pub trait TextRenderer {
    /// Width and height in pixels that `text` would occupy.
    fn text_size(&self, text: &str) -> (u32, u32);

    /// Draws `text` with its top-left corner at `(x, y)`.
    fn draw_text(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str);
}

/// Renders labels with a TrueType/OpenType font loaded at runtime.
pub struct FontTextRenderer {
    font: FontVec,
    scale: PxScale,
}

impl FontTextRenderer {
    /// Builds a renderer from raw font file bytes.
    pub fn from_bytes(bytes: Vec<u8>, size_px: f32) -> Result<Self, FontError> {
        let font = FontVec::try_from_vec(bytes).map_err(|_| FontError::InvalidFont {
            path: None,
        })?;
        Ok(Self {
            font,
            scale: PxScale::from(size_px),
        })
    }

    /// Loads a font file from disk.
    pub fn from_file(path: &Path, size_px: f32) -> Result<Self, FontError> {
        let bytes = fs::read(path).map_err(|e| FontError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes, size_px).map_err(|_| FontError::InvalidFont {
            path: Some(path.to_path_buf()),
        })
    }

    pub fn size_px(&self) -> f32 {
        self.scale.y
    }
}

impl fmt::Debug for FontTextRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontTextRenderer")
            .field("size_px", &self.scale.y)
            .finish_non_exhaustive()
    }
}

impl TextRenderer for FontTextRenderer {
    fn text_size(&self, text: &str) -> (u32, u32) {
        text_size(self.scale, &self.font, text)
    }

    fn draw_text(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        draw_text_mut(canvas, color, x, y, self.scale, &self.font, text);
    }
}

/// Renderer that draws nothing, used when no font is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTextRenderer;

impl TextRenderer for NullTextRenderer {
    fn text_size(&self, _text: &str) -> (u32, u32) {
        (0, 0)
    }

    fn draw_text(&self, _canvas: &mut RgbImage, _x: i32, _y: i32, _color: Rgb<u8>, _text: &str) {}
}

/// Errors that can occur while loading a font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// Font file could not be read
    Read { path: PathBuf, reason: String },
    /// Bytes are not a usable font
    InvalidFont { path: Option<PathBuf> },
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Read { path, reason } => {
                write!(f, "Cannot read font {}: {}", path.display(), reason)
            }
            FontError::InvalidFont { path: Some(path) } => {
                write!(f, "{} is not a valid TrueType/OpenType font", path.display())
            }
            FontError::InvalidFont { path: None } => {
                write!(f, "Font data is not a valid TrueType/OpenType font")
            }
        }
    }
}

impl std::error::Error for FontError {}

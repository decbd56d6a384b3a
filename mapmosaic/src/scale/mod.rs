//! Scale bar annotation
//!
//! Draws a horizontal reference bar near the bottom-left corner of a
//! [`Mosaic`], with ticks and labels at 0, 1/4, 1/2 and the full reference
//! distance. The bar length in pixels is the reference distance divided by
//! the ground resolution, so it does not depend on the mosaic size.
//!
//! Label glyphs are drawn through a [`TextRenderer`]; this module only
//! decides what the labels say and where they go.

mod text;

pub use text::{FontError, FontTextRenderer, NullTextRenderer, TextRenderer, DEFAULT_FONT_SIZE_PX};

use std::fmt;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::mosaic::Mosaic;

/// Fractions of the reference distance that get a tick and a label.
pub const TICK_FRACTIONS: [f64; 4] = [0.0, 0.25, 0.5, 1.0];

/// Default reference distance in ground meters.
pub const DEFAULT_REFERENCE_DISTANCE_M: f64 = 1000.0;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Formats a ground distance for a scale label.
///
/// Zero is a bare `0`, whole kilometers and above use `km`, anything shorter
/// is rounded to the meter.
///
/// ```
/// use mapmosaic::scale::format_distance;
///
/// assert_eq!(format_distance(0.0), "0");
/// assert_eq!(format_distance(250.0), "250 m");
/// assert_eq!(format_distance(1000.0), "1 km");
/// assert_eq!(format_distance(1500.0), "1.5 km");
/// ```
pub fn format_distance(meters: f64) -> String {
    if meters == 0.0 {
        "0".to_string()
    } else if meters >= 1000.0 {
        format!("{} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters)
    }
}

/// One tick of a laid-out scale bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleTick {
    pub fraction: f64,
    pub distance_m: f64,
    /// Absolute x position of the tick in mosaic pixels
    pub x: i64,
    pub label: String,
}

/// Pixel geometry of a scale bar on a specific mosaic.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBarLayout {
    /// Exact bar length, `reference_distance_m / terrain_meters_per_pixel`
    pub length_px: f64,
    /// Left end of the bar
    pub origin_x: i64,
    /// Row just below the bar; the bar occupies the rows above it
    pub baseline_y: i64,
    pub ticks: Vec<ScaleTick>,
}

impl ScaleBarLayout {
    /// Bar length as drawn, rounded to whole pixels.
    pub fn drawn_length_px(&self) -> u32 {
        self.length_px.round() as u32
    }

    /// Right end of the bar (exclusive).
    pub fn end_x(&self) -> i64 {
        self.origin_x + self.drawn_length_px() as i64
    }
}

/// Appearance and reference distance of the scale bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    reference_distance_m: f64,
    margin_px: u32,
    thickness_px: u32,
    tick_height_px: u32,
    tick_width_px: u32,
    label_gap_px: u32,
    padding_px: u32,
    color: Rgb<u8>,
    backdrop: Option<Rgb<u8>>,
}

impl Default for ScaleBar {
    fn default() -> Self {
        Self {
            reference_distance_m: DEFAULT_REFERENCE_DISTANCE_M,
            margin_px: 40,
            thickness_px: 4,
            tick_height_px: 10,
            tick_width_px: 2,
            label_gap_px: 4,
            padding_px: 8,
            color: BLACK,
            backdrop: Some(WHITE),
        }
    }
}

impl ScaleBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ground distance the full bar represents.
    pub fn with_reference_distance(mut self, meters: f64) -> Self {
        self.reference_distance_m = meters;
        self
    }

    /// Set the distance from the bottom-left corner to the bar.
    pub fn with_margin(mut self, margin_px: u32) -> Self {
        self.margin_px = margin_px;
        self
    }

    /// Set the box painted behind the bar, or `None` to draw straight on the map.
    pub fn with_backdrop(mut self, backdrop: Option<Rgb<u8>>) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn reference_distance_m(&self) -> f64 {
        self.reference_distance_m
    }

    /// Computes the bar geometry for an image of the given height.
    ///
    /// # Errors
    ///
    /// [`ScaleError::InvalidResolution`] when the ground resolution or the
    /// reference distance is not a positive finite number.
    pub fn layout(
        &self,
        image_height: u32,
        terrain_meters_per_pixel: f64,
    ) -> Result<ScaleBarLayout, ScaleError> {
        if !terrain_meters_per_pixel.is_finite() || terrain_meters_per_pixel <= 0.0 {
            return Err(ScaleError::InvalidResolution(terrain_meters_per_pixel));
        }
        if !self.reference_distance_m.is_finite() || self.reference_distance_m <= 0.0 {
            return Err(ScaleError::InvalidReferenceDistance(
                self.reference_distance_m,
            ));
        }

        let length_px = self.reference_distance_m / terrain_meters_per_pixel;
        let origin_x = self.margin_px as i64;
        let baseline_y = image_height as i64 - self.margin_px as i64;

        let ticks = TICK_FRACTIONS
            .iter()
            .map(|&fraction| {
                let distance_m = self.reference_distance_m * fraction;
                ScaleTick {
                    fraction,
                    distance_m,
                    x: origin_x + (length_px * fraction).round() as i64,
                    label: format_distance(distance_m),
                }
            })
            .collect();

        Ok(ScaleBarLayout {
            length_px,
            origin_x,
            baseline_y,
            ticks,
        })
    }

    /// Draws the bar onto `mosaic` and returns the layout used.
    ///
    /// The mosaic keeps its dimensions; anything falling outside is clipped.
    pub fn draw(
        &self,
        mosaic: &mut Mosaic,
        terrain_meters_per_pixel: f64,
        renderer: &dyn TextRenderer,
    ) -> Result<ScaleBarLayout, ScaleError> {
        let layout = self.layout(mosaic.height(), terrain_meters_per_pixel)?;
        let canvas = mosaic.image_mut();

        if layout.end_x() > canvas.width() as i64 || layout.baseline_y < 0 {
            warn!(
                length_px = layout.length_px,
                width = canvas.width(),
                height = canvas.height(),
                "Scale bar does not fit on the map and will be clipped"
            );
        }

        let label_sizes: Vec<(u32, u32)> = layout
            .ticks
            .iter()
            .map(|tick| renderer.text_size(&tick.label))
            .collect();
        let label_height = label_sizes.iter().map(|&(_, h)| h).max().unwrap_or(0);

        let bar_top = layout.baseline_y - self.thickness_px as i64;
        let tick_top = bar_top - self.tick_height_px as i64;
        let label_top = tick_top - self.label_gap_px as i64 - label_height as i64;

        if let Some(backdrop) = self.backdrop {
            let pad = self.padding_px as i64;
            let half_first = label_sizes.first().map(|&(w, _)| w as i64 / 2).unwrap_or(0);
            let half_last = label_sizes.last().map(|&(w, _)| w as i64 / 2).unwrap_or(0);
            let left = layout.origin_x - half_first - pad;
            let right = layout.end_x() + half_last + pad;
            let top = (if label_height > 0 { label_top } else { tick_top }) - pad;
            let bottom = layout.baseline_y + pad;
            fill_rect(canvas, left, top, right - left, bottom - top, backdrop);
        }

        // Bar
        fill_rect(
            canvas,
            layout.origin_x,
            bar_top,
            layout.drawn_length_px() as i64,
            self.thickness_px as i64,
            self.color,
        );

        for (tick, &(label_width, _)) in layout.ticks.iter().zip(&label_sizes) {
            let tick_x = tick
                .x
                .min(layout.end_x() - self.tick_width_px as i64)
                .max(layout.origin_x);
            fill_rect(
                canvas,
                tick_x,
                tick_top,
                self.tick_width_px as i64,
                self.tick_height_px as i64 + self.thickness_px as i64,
                self.color,
            );

            let label_x = tick.x - label_width as i64 / 2;
            renderer.draw_text(
                canvas,
                clamp_i32(label_x),
                clamp_i32(label_top),
                self.color,
                &tick.label,
            );
        }

        debug!(
            length_px = layout.length_px,
            reference_m = self.reference_distance_m,
            "Drew scale bar"
        );

        Ok(layout)
    }
}

/// Fills a rectangle, ignoring empty sizes.
fn fill_rect(canvas: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    if width <= 0 || height <= 0 {
        return;
    }
    let rect = Rect::at(clamp_i32(x), clamp_i32(y))
        .of_size(width.min(u32::MAX as i64) as u32, height.min(u32::MAX as i64) as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Errors that can occur while laying out a scale bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleError {
    /// Ground resolution is zero, negative or not a number
    InvalidResolution(f64),
    /// Reference distance is zero, negative or not a number
    InvalidReferenceDistance(f64),
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::InvalidResolution(value) => {
                write!(f, "Invalid ground resolution: {} m/px", value)
            }
            ScaleError::InvalidReferenceDistance(value) => {
                write!(f, "Invalid scale bar reference distance: {} m", value)
            }
        }
    }
}

impl std::error::Error for ScaleError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use std::cell::RefCell;

    /// Records every label drawn and reports a fixed glyph box per character.
    #[derive(Default)]
    struct RecordingRenderer {
        drawn: RefCell<Vec<(i32, i32, String)>>,
    }

    impl TextRenderer for RecordingRenderer {
        fn text_size(&self, text: &str) -> (u32, u32) {
            (text.len() as u32 * 6, 10)
        }

        fn draw_text(&self, _canvas: &mut RgbImage, x: i32, y: i32, _color: Rgb<u8>, text: &str) {
            self.drawn.borrow_mut().push((x, y, text.to_string()));
        }
    }

    fn white_mosaic(width: u32, height: u32) -> Mosaic {
        Mosaic::from_image(RgbImage::from_pixel(width, height, WHITE))
    }

    fn black_run(image: &RgbImage, y: u32) -> u32 {
        (0..image.width())
            .filter(|&x| *image.get_pixel(x, y) == BLACK)
            .count() as u32
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0");
        assert_eq!(format_distance(250.0), "250 m");
        assert_eq!(format_distance(500.0), "500 m");
        assert_eq!(format_distance(1000.0), "1 km");
        assert_eq!(format_distance(2000.0), "2 km");
        assert_eq!(format_distance(62.4), "62 m");
    }

    #[test]
    fn test_layout_labels() {
        let layout = ScaleBar::new().layout(1000, 2.0).unwrap();
        let labels: Vec<_> = layout.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "250 m", "500 m", "1 km"]);
    }

    #[test]
    fn test_layout_tick_positions() {
        let layout = ScaleBar::new().with_margin(10).layout(1000, 2.0).unwrap();

        assert_eq!(layout.length_px, 500.0);
        let xs: Vec<_> = layout.ticks.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![10, 135, 260, 510]);
        assert_eq!(layout.baseline_y, 990);
    }

    #[test]
    fn test_layout_rejects_bad_resolution() {
        let bar = ScaleBar::new();
        assert_eq!(
            bar.layout(100, 0.0),
            Err(ScaleError::InvalidResolution(0.0))
        );
        assert!(bar.layout(100, f64::NAN).is_err());
        assert!(ScaleBar::new()
            .with_reference_distance(-5.0)
            .layout(100, 1.0)
            .is_err());
    }

    #[test]
    fn test_drawn_bar_length_matches_resolution() {
        let ctx = Calibration::default().scale_context(45.28787).unwrap();
        let bar = ScaleBar::new().with_backdrop(None);
        let mut mosaic = white_mosaic(1280, 1536);

        let layout = bar
            .draw(&mut mosaic, ctx.terrain_meters_per_pixel(), &NullTextRenderer)
            .unwrap();

        let expected = DEFAULT_REFERENCE_DISTANCE_M / ctx.terrain_meters_per_pixel();
        assert_eq!(layout.length_px, expected);
        let bar_row = (layout.baseline_y - 1) as u32;
        assert_eq!(black_run(mosaic.image(), bar_row), expected.round() as u32);
    }

    #[test]
    fn test_bar_length_independent_of_mosaic_size() {
        let bar = ScaleBar::new();
        let small = bar.layout(300, 3.0).unwrap();
        let large = bar.layout(9000, 3.0).unwrap();
        assert_eq!(small.length_px, large.length_px);
    }

    #[test]
    fn test_draw_keeps_dimensions() {
        let mut mosaic = white_mosaic(200, 100);
        ScaleBar::new()
            .draw(&mut mosaic, 10.0, &NullTextRenderer)
            .unwrap();
        assert_eq!((mosaic.width(), mosaic.height()), (200, 100));
    }

    #[test]
    fn test_labels_are_centered_above_ticks() {
        let renderer = RecordingRenderer::default();
        let mut mosaic = white_mosaic(800, 400);
        let layout = ScaleBar::new()
            .with_margin(20)
            .draw(&mut mosaic, 2.0, &renderer)
            .unwrap();

        let drawn = renderer.drawn.borrow();
        assert_eq!(drawn.len(), 4);
        for ((x, y, label), tick) in drawn.iter().zip(&layout.ticks) {
            assert_eq!(label, &tick.label);
            assert_eq!(*x as i64, tick.x - (label.len() as i64 * 6) / 2);
            // label bottom sits above the tick top: 380 - 4 - 10 - 4 - 10
            assert_eq!(*y, 352);
        }
    }

    #[test]
    fn test_backdrop_is_painted() {
        let mut mosaic = Mosaic::from_image(RgbImage::from_pixel(400, 200, Rgb([0, 128, 0])));
        let layout = ScaleBar::new()
            .with_margin(30)
            .draw(&mut mosaic, 4.0, &NullTextRenderer)
            .unwrap();

        // Just below the bar, inside the padding
        let y = layout.baseline_y as u32 + 2;
        assert_eq!(*mosaic.image().get_pixel(100, y), WHITE);
        // Far away from the bar the map is untouched
        assert_eq!(*mosaic.image().get_pixel(390, 5), Rgb([0, 128, 0]));
    }

    #[test]
    fn test_oversized_bar_is_clipped() {
        let mut mosaic = white_mosaic(100, 100);
        let layout = ScaleBar::new()
            .with_backdrop(None)
            .draw(&mut mosaic, 1.0, &NullTextRenderer)
            .unwrap();

        assert_eq!(layout.length_px, 1000.0);
        let bar_row = (layout.baseline_y - 1) as u32;
        assert_eq!(black_run(mosaic.image(), bar_row), 100 - 40);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_length_invariant(
                meters_per_pixel in 0.5..20.0_f64,
                height in 100u32..5000
            ) {
                let layout = ScaleBar::new().layout(height, meters_per_pixel)?;
                prop_assert_eq!(layout.length_px, 1000.0 / meters_per_pixel);
                prop_assert_eq!(layout.ticks.len(), 4);
                prop_assert_eq!(layout.ticks[0].x, layout.origin_x);
                prop_assert_eq!(layout.ticks[3].x, layout.end_x());
            }
        }
    }
}

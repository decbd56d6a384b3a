//! WMTS calibration constants and the per-latitude scale context.
//!
//! A [`Calibration`] describes one tile matrix of one tile service: the
//! ellipsoid radius, the top-left corner of the matrix, the scale denominator
//! the service declares for the zoom level, and the rendering pixel pitch the
//! denominator is expressed against. Everything the geometry pipeline needs is
//! derived from it, so switching providers only means building another value.
//!
//! # Default calibration
//!
//! The defaults come from the GetCapabilities response of the IGN Geoportail
//! `PM` tile matrix set (EPSG:3857) at zoom level 15:
//!
//! ```text
//! <ScaleDenominator>17061.8366707982724577</ScaleDenominator>
//! <TopLeftCorner>-20037508 20037508</TopLeftCorner>
//! <TileWidth>256</TileWidth> <TileHeight>256</TileHeight>
//! <MatrixWidth>32768</MatrixWidth> <MatrixHeight>32768</MatrixHeight>
//! ```

use std::f64::consts::PI;

use crate::coord::{CoordError, MAX_LAT, MIN_LAT};

/// Equatorial radius (semi-major axis) of the WGS84 ellipsoid in meters.
pub const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// Standardized WMTS rendering pixel size (0.28mm × 0.28mm), in paper meters.
pub const RENDERING_PIXEL_SIZE_M: f64 = 0.00028;

/// Zoom level whose scale denominator the default calibration carries.
pub const DEFAULT_ZOOM: u8 = 15;

/// Scale denominator for zoom 15 (close to, but not exactly, 1:25000).
#[allow(clippy::excessive_precision)]
pub const DEFAULT_SCALE_DENOMINATOR: f64 = 17061.8366707982724577;

/// Tile edge length in pixels.
pub const DEFAULT_TILE_SIZE_PX: u32 = 256;

/// Tile matrix top-left corner in Web Mercator meters.
pub const DEFAULT_TOP_LEFT_X: f64 = -20_037_508.0;
pub const DEFAULT_TOP_LEFT_Y: f64 = 20_037_508.0;

/// Number of tiles per matrix axis at zoom 15.
pub const DEFAULT_MATRIX_SIZE: u32 = 32_768;

/// Relative difference allowed between a declared scale denominator and the
/// one its tile matrix implies (GetCapabilities values are rounded).
pub const MATRIX_SCALE_TOLERANCE: f64 = 1e-3;

/// Immutable calibration of a single WMTS tile matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    earth_radius_m: f64,
    zoom: u8,
    scale_denominator: f64,
    pixel_size_m: f64,
    tile_size_px: u32,
    top_left_x: f64,
    top_left_y: f64,
    matrix_width: u32,
    matrix_height: u32,
    reference_latitude_deg: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            earth_radius_m: EARTH_EQUATORIAL_RADIUS_M,
            zoom: DEFAULT_ZOOM,
            scale_denominator: DEFAULT_SCALE_DENOMINATOR,
            pixel_size_m: RENDERING_PIXEL_SIZE_M,
            tile_size_px: DEFAULT_TILE_SIZE_PX,
            top_left_x: DEFAULT_TOP_LEFT_X,
            top_left_y: DEFAULT_TOP_LEFT_Y,
            matrix_width: DEFAULT_MATRIX_SIZE,
            matrix_height: DEFAULT_MATRIX_SIZE,
            reference_latitude_deg: 0.0,
        }
    }
}

impl Calibration {
    /// Set the zoom level and the scale denominator declared for it.
    ///
    /// The matrix is resized to `2^zoom` tiles per axis.
    pub fn with_zoom(mut self, zoom: u8, scale_denominator: f64) -> Self {
        self.zoom = zoom;
        self.scale_denominator = scale_denominator;
        self.matrix_width = 1u32 << zoom.min(31);
        self.matrix_height = self.matrix_width;
        self
    }

    /// Set the tile matrix top-left corner (Web Mercator meters).
    pub fn with_top_left_corner(mut self, x: f64, y: f64) -> Self {
        self.top_left_x = x;
        self.top_left_y = y;
        self
    }

    /// Set the tile edge length in pixels.
    pub fn with_tile_size_px(mut self, tile_size_px: u32) -> Self {
        self.tile_size_px = tile_size_px;
        self
    }

    /// Set the latitude at which the declared scale denominator is true.
    pub fn with_reference_latitude(mut self, latitude_deg: f64) -> Self {
        self.reference_latitude_deg = latitude_deg;
        self
    }

    /// Set the ellipsoid equatorial radius.
    pub fn with_earth_radius(mut self, radius_m: f64) -> Self {
        self.earth_radius_m = radius_m;
        self
    }

    /// Set the zoom level and derive its scale denominator from the matrix.
    ///
    /// See [`Calibration::matrix_scale_denominator`].
    pub fn with_matrix_zoom(self, zoom: u8) -> Self {
        let scale_denominator = self.matrix_scale_denominator(zoom);
        self.with_zoom(zoom, scale_denominator)
    }

    /// Scale denominator of a world-wide matrix of `2^zoom` tiles per axis.
    ///
    /// The equator (`2πR`) spans `tile_size_px × 2^zoom` rendered pixels of
    /// `pixel_size_m` each.
    pub fn matrix_scale_denominator(&self, zoom: u8) -> f64 {
        2.0 * PI * self.earth_radius_m
            / (self.tile_size_px as f64 * 2f64.powi(zoom as i32) * self.pixel_size_m)
    }

    /// Whether the declared scale denominator fits the `2^zoom` matrix.
    ///
    /// Tile indices from the planar route and from the direct degree formula
    /// only agree when this holds.
    pub fn matches_matrix(&self) -> bool {
        let expected = self.matrix_scale_denominator(self.zoom);
        ((self.scale_denominator - expected) / expected).abs() <= MATRIX_SCALE_TOLERANCE
    }

    pub fn earth_radius_m(&self) -> f64 {
        self.earth_radius_m
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn scale_denominator(&self) -> f64 {
        self.scale_denominator
    }

    pub fn pixel_size_m(&self) -> f64 {
        self.pixel_size_m
    }

    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    /// Top-left corner of the tile matrix as `(x, y)` in Mercator meters.
    pub fn top_left_corner(&self) -> (f64, f64) {
        (self.top_left_x, self.top_left_y)
    }

    /// Matrix dimensions as `(columns, rows)`.
    pub fn matrix_size(&self) -> (u32, u32) {
        (self.matrix_width, self.matrix_height)
    }

    pub fn reference_latitude_deg(&self) -> f64 {
        self.reference_latitude_deg
    }

    /// Mercator (projected) meters covered by one rendered pixel.
    pub fn planar_meters_per_pixel(&self) -> f64 {
        self.pixel_size_m * self.scale_denominator
    }

    /// Mercator (projected) meters covered by one tile edge.
    pub fn tile_size_planar_meters(&self) -> f64 {
        self.tile_size_px as f64 * self.planar_meters_per_pixel()
    }

    /// Ground meters per degree of arc along the equator.
    pub fn meters_per_degree(&self) -> f64 {
        self.earth_radius_m * PI / 180.0
    }

    /// Build the scale context valid at `latitude_deg` for this calibration.
    pub fn scale_context(&self, latitude_deg: f64) -> Result<ScaleContext, CoordError> {
        if !latitude_deg.is_finite() || latitude_deg <= MIN_LAT || latitude_deg >= MAX_LAT {
            return Err(CoordError::InvalidLatitude(latitude_deg));
        }

        let correction =
            latitude_deg.to_radians().cos() / self.reference_latitude_deg.to_radians().cos();
        let real_scale_denominator = self.scale_denominator * correction;
        let terrain_meters_per_pixel = self.pixel_size_m * real_scale_denominator;

        Ok(ScaleContext {
            latitude_deg,
            real_scale_denominator,
            terrain_meters_per_pixel,
            terrain_meters_per_tile: terrain_meters_per_pixel * self.tile_size_px as f64,
            pixel_size_m: self.pixel_size_m,
        })
    }
}

/// Derived scale constants valid for one (zoom level, latitude) pair.
///
/// The service's pixel pitch on paper is constant, but the ground distance
/// a pixel covers shrinks with `cos(latitude)` under Web Mercator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleContext {
    latitude_deg: f64,
    real_scale_denominator: f64,
    terrain_meters_per_pixel: f64,
    terrain_meters_per_tile: f64,
    pixel_size_m: f64,
}

impl ScaleContext {
    /// Latitude this context was computed for.
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    /// True paper scale at this latitude (terrain meters per paper meter).
    pub fn real_scale_denominator(&self) -> f64 {
        self.real_scale_denominator
    }

    pub fn terrain_meters_per_pixel(&self) -> f64 {
        self.terrain_meters_per_pixel
    }

    pub fn terrain_meters_per_tile(&self) -> f64 {
        self.terrain_meters_per_tile
    }

    /// Terrain meters represented by one centimeter of paper.
    pub fn terrain_meters_per_paper_cm(&self) -> f64 {
        self.real_scale_denominator / 100.0
    }

    pub fn paper_cm_to_terrain_m(&self, paper_cm: f64) -> f64 {
        paper_cm * self.terrain_meters_per_paper_cm()
    }

    pub fn terrain_m_to_paper_cm(&self, terrain_m: f64) -> f64 {
        terrain_m / self.terrain_meters_per_paper_cm()
    }

    pub fn terrain_m_to_pixels(&self, terrain_m: f64) -> f64 {
        terrain_m / self.terrain_meters_per_pixel
    }

    /// Paper centimeters covered by `pixels` rendered pixels.
    pub fn pixels_to_paper_cm(&self, pixels: f64) -> f64 {
        pixels * self.pixel_size_m * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_default_tile_size_matches_matrix() {
        let calibration = Calibration::default();
        // 256 px × 0.28mm × 17061.84 ≈ 1222.99 m, i.e. 2 × 20037508 / 32768
        let expected = 2.0 * 20_037_508.342_789_244 / 32_768.0;
        assert!(approx(calibration.tile_size_planar_meters(), expected, 0.01));
    }

    #[test]
    fn test_scale_context_at_reference_latitude() {
        let calibration = Calibration::default();
        let ctx = calibration.scale_context(0.0).unwrap();

        assert!(approx(ctx.real_scale_denominator(), DEFAULT_SCALE_DENOMINATOR, 1e-9));
        assert!(approx(
            ctx.terrain_meters_per_pixel(),
            calibration.planar_meters_per_pixel(),
            1e-9
        ));
    }

    #[test]
    fn test_scale_context_shrinks_with_latitude() {
        let calibration = Calibration::default();
        let ctx = calibration.scale_context(60.0).unwrap();

        // cos(60°) = 0.5
        assert!(approx(
            ctx.real_scale_denominator(),
            DEFAULT_SCALE_DENOMINATOR / 2.0,
            1e-6
        ));
        assert!(approx(
            ctx.terrain_meters_per_tile(),
            calibration.tile_size_planar_meters() / 2.0,
            1e-6
        ));
    }

    #[test]
    fn test_scale_context_rejects_poles() {
        let calibration = Calibration::default();
        assert!(matches!(
            calibration.scale_context(90.0),
            Err(CoordError::InvalidLatitude(_))
        ));
        assert!(matches!(
            calibration.scale_context(-90.0),
            Err(CoordError::InvalidLatitude(_))
        ));
        assert!(calibration.scale_context(f64::NAN).is_err());
    }

    #[test]
    fn test_reference_latitude_moves_true_scale() {
        let calibration = Calibration::default().with_reference_latitude(45.0);
        let ctx = calibration.scale_context(45.0).unwrap();
        assert!(approx(ctx.real_scale_denominator(), DEFAULT_SCALE_DENOMINATOR, 1e-6));
    }

    #[test]
    fn test_paper_terrain_conversions_invert() {
        let ctx = Calibration::default().scale_context(45.28787).unwrap();
        let terrain = ctx.paper_cm_to_terrain_m(21.0);
        assert!(approx(ctx.terrain_m_to_paper_cm(terrain), 21.0, 1e-9));
    }

    #[test]
    fn test_pixels_to_paper_cm() {
        let ctx = Calibration::default().scale_context(10.0).unwrap();
        // One tile is 256 × 0.028 cm on paper regardless of latitude
        assert!(approx(ctx.pixels_to_paper_cm(256.0), 7.168, 1e-9));
    }

    #[test]
    fn test_with_zoom_resizes_matrix() {
        let calibration = Calibration::default().with_zoom(16, 8530.918_335_399_136);
        assert_eq!(calibration.zoom(), 16);
        assert_eq!(calibration.matrix_size(), (65_536, 65_536));
        assert!(approx(
            calibration.tile_size_planar_meters(),
            Calibration::default().tile_size_planar_meters() / 2.0,
            0.01
        ));
    }

    #[test]
    fn test_matrix_scale_denominator_matches_declared_default() {
        let calibration = Calibration::default();
        assert!(approx(
            calibration.matrix_scale_denominator(DEFAULT_ZOOM),
            DEFAULT_SCALE_DENOMINATOR,
            1e-6
        ));
        assert!(calibration.matches_matrix());
    }

    #[test]
    fn test_zoom_without_its_denominator_breaks_matrix() {
        let calibration = Calibration::default().with_zoom(16, DEFAULT_SCALE_DENOMINATOR);
        assert!(!calibration.matches_matrix());

        let derived = Calibration::default().with_matrix_zoom(16);
        assert!(derived.matches_matrix());
        assert!(approx(derived.scale_denominator(), DEFAULT_SCALE_DENOMINATOR / 2.0, 1e-6));
    }

    #[test]
    fn test_alternate_calibration() {
        let radius = 6_371_000.0;
        let calibration = Calibration::default()
            .with_earth_radius(radius)
            .with_tile_size_px(512)
            .with_top_left_corner(-PI * radius, PI * radius)
            .with_matrix_zoom(10);

        assert_eq!(calibration.matrix_size(), (1024, 1024));
        assert!(calibration.matches_matrix());
        assert!(approx(
            calibration.tile_size_planar_meters(),
            2.0 * PI * radius / 1024.0,
            1e-6
        ));
        assert!(approx(calibration.meters_per_degree(), radius * PI / 180.0, 1e-9));

        // Ground scale still follows cos(latitude)
        let ctx = calibration.scale_context(60.0).unwrap();
        assert!(approx(
            ctx.terrain_meters_per_tile(),
            calibration.tile_size_planar_meters() / 2.0,
            1e-6
        ));
    }

    #[test]
    fn test_top_left_corner_offsets_tile_indices() {
        use crate::coord::{planar_to_tile_index, PlanarPoint};

        let base = Calibration::default();
        let shifted = base.with_top_left_corner(
            DEFAULT_TOP_LEFT_X - base.tile_size_planar_meters(),
            DEFAULT_TOP_LEFT_Y + base.tile_size_planar_meters(),
        );
        let point = PlanarPoint {
            x: 644_000.0,
            y: 5_666_000.0,
        };

        let a = planar_to_tile_index(point, DEFAULT_ZOOM, &base).unwrap();
        let b = planar_to_tile_index(point, DEFAULT_ZOOM, &shifted).unwrap();
        assert_eq!(b.col, a.col + 1);
        assert_eq!(b.row, a.row + 1);
    }
}

//! Settings structs for each `[section]` of config.ini, and their defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::calibration::{
    Calibration, DEFAULT_SCALE_DENOMINATOR, DEFAULT_TILE_SIZE_PX, DEFAULT_TOP_LEFT_X,
    DEFAULT_TOP_LEFT_Y, DEFAULT_ZOOM, EARTH_EQUATORIAL_RADIUS_M,
};
use crate::mosaic::DEFAULT_JPEG_QUALITY;
use crate::provider::{
    WmtsConfig, DEFAULT_ENDPOINT, DEFAULT_FORMAT, DEFAULT_LAYER, DEFAULT_MAP_NAME,
    DEFAULT_REFERER, DEFAULT_STYLE, DEFAULT_TILE_MATRIX_SET, DEFAULT_TIMEOUT_SECS,
};
use crate::scale::DEFAULT_FONT_SIZE_PX;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub provider: ProviderSettings,
    pub calibration: CalibrationSettings,
    pub cache: CacheSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            calibration: CalibrationSettings::default(),
            cache: CacheSettings::default(),
            output: OutputSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// `[provider]`: WMTS layer and transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub map_name: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub layer: String,
    pub style: String,
    pub tile_matrix_set: String,
    pub format: String,
    /// Sent as the `Referer` header; empty disables it
    pub referer: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            map_name: DEFAULT_MAP_NAME.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            layer: DEFAULT_LAYER.to_string(),
            style: DEFAULT_STYLE.to_string(),
            tile_matrix_set: DEFAULT_TILE_MATRIX_SET.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            referer: Some(DEFAULT_REFERER.to_string()),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderSettings {
    pub fn wmts_config(&self) -> WmtsConfig {
        WmtsConfig {
            map_name: self.map_name.clone(),
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            layer: self.layer.clone(),
            style: self.style.clone(),
            tile_matrix_set: self.tile_matrix_set.clone(),
            format: self.format.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// `[calibration]`: tile matrix constants of the service.
///
/// The parser only accepts a `scale_denominator` that fits the `2^zoom`
/// matrix for the configured radius and tile size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSettings {
    pub zoom: u8,
    pub scale_denominator: f64,
    /// Latitude at which the scale denominator is true
    pub reference_latitude: f64,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Matrix top-left corner in Mercator meters
    pub top_left_x: f64,
    pub top_left_y: f64,
    pub earth_radius: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            scale_denominator: DEFAULT_SCALE_DENOMINATOR,
            reference_latitude: 0.0,
            tile_size: DEFAULT_TILE_SIZE_PX,
            top_left_x: DEFAULT_TOP_LEFT_X,
            top_left_y: DEFAULT_TOP_LEFT_Y,
            earth_radius: EARTH_EQUATORIAL_RADIUS_M,
        }
    }
}

impl CalibrationSettings {
    /// Builds the calibration these settings describe.
    pub fn calibration(&self) -> Calibration {
        self.matrix()
            .with_zoom(self.zoom, self.scale_denominator)
            .with_reference_latitude(self.reference_latitude)
    }

    /// Calibration carrying the matrix geometry but still the default zoom.
    pub(super) fn matrix(&self) -> Calibration {
        Calibration::default()
            .with_earth_radius(self.earth_radius)
            .with_tile_size_px(self.tile_size)
            .with_top_left_corner(self.top_left_x, self.top_left_y)
    }
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub directory: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_dir(),
        }
    }
}

/// `[output]`: where and how the finished map is written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    /// TrueType/OpenType font for scale bar labels
    pub font: Option<PathBuf>,
    pub font_size: f32,
    pub jpeg_quality: u8,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            font: None,
            font_size: DEFAULT_FONT_SIZE_PX,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
        }
    }
}

/// Name of the per-user configuration directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".mapmosaic";

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// The per-user configuration directory (`~/.mapmosaic`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// The configuration file path (`~/.mapmosaic/config.ini`).
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Default tile cache directory (`~/.mapmosaic/cache`).
pub fn default_cache_dir() -> PathBuf {
    config_directory().join("cache")
}

/// Default log directory (`~/.mapmosaic/logs`).
pub fn default_log_dir() -> PathBuf {
    config_directory().join("logs")
}

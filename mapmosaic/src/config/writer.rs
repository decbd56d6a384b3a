//! INI serialization: `ConfigFile` to the commented text written to
//! `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let provider = &config.provider;
    let api_key = provider.api_key.as_deref().unwrap_or("");
    let referer = provider.referer.as_deref().unwrap_or("");
    let font = config
        .output
        .font
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[provider]
; Short name of the map, used in tile and output file names
map_name = {}
; WMTS endpoint. "{{api_key}}" is replaced by api_key below
endpoint = {}
; Geoportail API key (required when the endpoint contains {{api_key}})
api_key = {}
layer = {}
style = {}
tile_matrix_set = {}
format = {}
; Referer header sent with every request (empty to disable)
referer = {}
; Request timeout in seconds
timeout = {}

[calibration]
; Tile matrix zoom level and its declared scale denominator.
; Leave scale_denominator empty to derive it from the zoom
zoom = {}
scale_denominator = {}
; Latitude at which the scale denominator is true (0 for Web Mercator)
reference_latitude = {}
; Tile matrix geometry from the service's GetCapabilities
tile_size = {}
top_left_x = {}
top_left_y = {}
earth_radius = {}

[cache]
; Directory holding downloaded tiles
directory = {}

[output]
; Directory where assembled maps are written
directory = {}
; TrueType/OpenType font used for scale bar labels (empty: no labels)
font = {}
font_size = {}
; JPEG quality, 1-100
jpeg_quality = {}

[logging]
directory = {}
"#,
        provider.map_name,
        provider.endpoint,
        api_key,
        provider.layer,
        provider.style,
        provider.tile_matrix_set,
        provider.format,
        referer,
        provider.timeout,
        config.calibration.zoom,
        config.calibration.scale_denominator,
        config.calibration.reference_latitude,
        config.calibration.tile_size,
        config.calibration.top_left_x,
        config.calibration.top_left_y,
        config.calibration.earth_radius,
        path_to_string(&config.cache.directory),
        path_to_string(&config.output.directory),
        font,
        config.output.font_size,
        config.output.jpeg_quality,
        path_to_string(&config.logging.directory),
    )
}

/// Formats a path, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

//! INI parsing: maps `Ini` sections and keys onto [`ConfigFile`] fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{CalibrationSettings, ConfigFile};

/// Parses an `Ini` into a [`ConfigFile`].
///
/// Starts from the defaults and overlays every value present. Empty values
/// keep the default.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider]
    if let Some(section) = ini.section(Some("provider")) {
        let provider = &mut config.provider;
        if let Some(v) = non_empty(section, "map_name") {
            if v.contains(['/', '\\']) {
                return Err(invalid("provider", "map_name", v, "must not contain path separators"));
            }
            provider.map_name = v.to_string();
        }
        if let Some(v) = non_empty(section, "endpoint") {
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("provider", "endpoint", v, "must be an http(s) URL"));
            }
            provider.endpoint = v.to_string();
        }
        if let Some(v) = non_empty(section, "api_key") {
            provider.api_key = Some(v.to_string());
        }
        if let Some(v) = non_empty(section, "layer") {
            provider.layer = v.to_string();
        }
        if let Some(v) = non_empty(section, "style") {
            provider.style = v.to_string();
        }
        if let Some(v) = non_empty(section, "tile_matrix_set") {
            provider.tile_matrix_set = v.to_string();
        }
        if let Some(v) = non_empty(section, "format") {
            provider.format = v.to_string();
        }
        if let Some(v) = section.get("referer") {
            let v = v.trim();
            provider.referer = if v.is_empty() { None } else { Some(v.to_string()) };
        }
        if let Some(v) = non_empty(section, "timeout") {
            provider.timeout = parse_positive::<u64>(v).ok_or_else(|| {
                invalid("provider", "timeout", v, "must be a positive integer (seconds)")
            })?;
        }
    }

    // [calibration]
    if let Some(section) = ini.section(Some("calibration")) {
        parse_calibration(section, &mut config.calibration)?;
    }

    // [cache]
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section, "directory") {
            config.cache.directory = expand_tilde(v);
        }
    }

    // [output]
    if let Some(section) = ini.section(Some("output")) {
        let output = &mut config.output;
        if let Some(v) = non_empty(section, "directory") {
            output.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "font") {
            output.font = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section, "font_size") {
            output.font_size = parse_positive::<f32>(v)
                .ok_or_else(|| invalid("output", "font_size", v, "must be a positive number (pixels)"))?;
        }
        if let Some(v) = non_empty(section, "jpeg_quality") {
            output.jpeg_quality = v
                .parse::<u8>()
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or_else(|| invalid("output", "jpeg_quality", v, "must be an integer 1-100"))?;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
    }

    Ok(config)
}

/// Parses `[calibration]`.
///
/// Without `scale_denominator` the denominator is derived from the zoom and
/// matrix geometry. A declared one must match the `2^zoom` matrix.
fn parse_calibration(
    section: &Properties,
    calibration: &mut CalibrationSettings,
) -> Result<(), ConfigFileError> {
    if let Some(v) = non_empty(section, "zoom") {
        calibration.zoom = v
            .parse::<u8>()
            .ok()
            .filter(|z| *z <= 30)
            .ok_or_else(|| invalid("calibration", "zoom", v, "must be an integer 0-30"))?;
    }
    if let Some(v) = non_empty(section, "tile_size") {
        calibration.tile_size = v
            .parse::<u32>()
            .ok()
            .filter(|t| (1..=4096).contains(t))
            .ok_or_else(|| {
                invalid("calibration", "tile_size", v, "must be an integer 1-4096 (pixels)")
            })?;
    }
    if let Some(v) = non_empty(section, "earth_radius") {
        calibration.earth_radius = parse_positive::<f64>(v)
            .filter(|r| r.is_finite())
            .ok_or_else(|| invalid("calibration", "earth_radius", v, "must be a positive number"))?;
    }
    for key in ["top_left_x", "top_left_y"] {
        if let Some(v) = non_empty(section, key) {
            let value = v
                .parse::<f64>()
                .ok()
                .filter(|c| c.is_finite())
                .ok_or_else(|| invalid("calibration", key, v, "must be a number (meters)"))?;
            if key == "top_left_x" {
                calibration.top_left_x = value;
            } else {
                calibration.top_left_y = value;
            }
        }
    }
    if let Some(v) = non_empty(section, "reference_latitude") {
        calibration.reference_latitude = v
            .parse::<f64>()
            .ok()
            .filter(|lat| lat.is_finite() && lat.abs() < 90.0)
            .ok_or_else(|| {
                invalid(
                    "calibration",
                    "reference_latitude",
                    v,
                    "must be a latitude strictly between -90 and 90",
                )
            })?;
    }

    let matrix = calibration.matrix();
    match non_empty(section, "scale_denominator") {
        Some(v) => {
            calibration.scale_denominator = parse_positive::<f64>(v).ok_or_else(|| {
                invalid("calibration", "scale_denominator", v, "must be a positive number")
            })?;
            if !calibration.calibration().matches_matrix() {
                return Err(invalid(
                    "calibration",
                    "scale_denominator",
                    v,
                    &format!(
                        "does not match the zoom {} tile matrix (expected about {:.4})",
                        calibration.zoom,
                        matrix.matrix_scale_denominator(calibration.zoom)
                    ),
                ));
            }
        }
        None => {
            calibration.scale_denominator = matrix.matrix_scale_denominator(calibration.zoom);
        }
    }
    Ok(())
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_positive<T>(value: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    value.parse::<T>().ok().filter(|v| *v > T::default())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

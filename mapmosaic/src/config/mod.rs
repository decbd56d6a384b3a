//! User configuration
//!
//! `~/.mapmosaic/config.ini` holds the provider, calibration, cache, output
//! and logging settings. A missing file means defaults; command-line options
//! override individual values.

mod file;
mod parser;
mod settings;
mod writer;

pub use file::ConfigFileError;
pub use settings::{
    config_directory, config_file_path, default_cache_dir, default_log_dir, CacheSettings,
    CalibrationSettings, ConfigFile, LoggingSettings, OutputSettings, ProviderSettings,
    CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};

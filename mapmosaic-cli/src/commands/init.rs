//! Init command - initialize configuration file.

use mapmosaic::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();

    if ConfigFile::ensure_exists_at(&path)? {
        println!("Created configuration file: {}", path.display());
    } else {
        println!("Configuration file already exists: {}", path.display());
    }
    println!();
    println!("Edit this file to set your API key, map layer and output settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

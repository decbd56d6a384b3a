//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use mapmosaic::cache::CacheError;
use mapmosaic::config::ConfigFileError;
use mapmosaic::mosaic::MosaicError;
use mapmosaic::orchestrator::MapError;
use mapmosaic::provider::ProviderError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or written
    Config(ConfigFileError),
    /// Tile provider could not be set up
    ProviderSetup(ProviderError),
    /// The map pipeline failed
    Map(MapError),
    /// Cache management failed
    Cache(CacheError),
    /// Failed to create the output directory
    OutputDir { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::ProviderSetup(ProviderError::InvalidConfig(_)) => {
                eprintln!();
                eprintln!("The configured endpoint needs an API key. Either:");
                eprintln!("  1. Pass it with --api-key <KEY>");
                eprintln!("  2. Set api_key in the [provider] section of config.ini");
                eprintln!("     (run `mapmosaic init` to create the file)");
            }
            CliError::Map(MapError::Fetch {
                source: ProviderError::HttpStatus { status, .. },
                ..
            }) if matches!(status, 401 | 403) => {
                eprintln!();
                eprintln!("The tile service refused the request. Make sure:");
                eprintln!("  1. Your API key is valid for the requested layer");
                eprintln!("  2. The referer in config.ini matches the one the key is restricted to");
            }
            CliError::Map(MapError::Fetch {
                source: ProviderError::InvalidResponse(_),
                ..
            }) => {
                eprintln!();
                eprintln!("The tile service answered with something that is not a tile image,");
                eprintln!("often a quota or error page. Check the layer, format and API key.");
            }
            CliError::Map(MapError::Mosaic(MosaicError::UnreadableTile { .. })) => {
                eprintln!();
                eprintln!("A cached tile is damaged. Run the command again with --force");
                eprintln!("to download every tile of the map again.");
            }
            CliError::Map(MapError::Fetch { .. }) => {
                eprintln!();
                eprintln!("Tiles downloaded before the failure are cached;");
                eprintln!("running the same command again resumes from there.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::ProviderSetup(e) => write!(f, "Failed to set up tile provider: {}", e),
            CliError::Map(e) => write!(f, "{}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::OutputDir { path, error } => {
                write!(
                    f,
                    "Failed to create output directory '{}': {}",
                    path.display(),
                    error
                )
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::ProviderSetup(e) => Some(e),
            CliError::Map(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::OutputDir { error, .. } => Some(error),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<MapError> for CliError {
    fn from(e: MapError) -> Self {
        CliError::Map(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and construction of
//! the provider, cache and text renderer used by the download command.

use std::path::Path;

use tracing::{info, warn};

use mapmosaic::cache::DiskTileCache;
use mapmosaic::calibration::Calibration;
use mapmosaic::config::ConfigFile;
use mapmosaic::logging::{init_logging, LoggingGuard, DEFAULT_LOG_FILE};
use mapmosaic::orchestrator::MapOrchestrator;
use mapmosaic::provider::{ReqwestClient, WmtsProvider};
use mapmosaic::scale::{FontTextRenderer, NullTextRenderer, TextRenderer};

use crate::error::CliError;

/// The orchestrator used by the CLI: WMTS over reqwest, cached on disk.
pub type CliOrchestrator = MapOrchestrator<WmtsProvider<ReqwestClient>, DiskTileCache>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Log at debug level and echo it on stderr
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.directory, DEFAULT_LOG_FILE, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("MapMosaic v{}", mapmosaic::VERSION);
        info!("MapMosaic CLI: {} command", command);
    }

    /// Calibration of the configured tile matrix.
    pub fn calibration(&self) -> Calibration {
        self.config.calibration.calibration()
    }

    /// Create the orchestrator for the configured provider and cache.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Overrides the configured API key when given
    pub fn create_orchestrator(&self, api_key: Option<String>) -> Result<CliOrchestrator, CliError> {
        let settings = &self.config.provider;
        let mut wmts_config = settings.wmts_config();
        if api_key.is_some() {
            wmts_config.api_key = api_key;
        }

        let http_client =
            ReqwestClient::with_options(settings.timeout(), settings.referer.as_deref())
                .map_err(CliError::ProviderSetup)?;
        let calibration = self.calibration();
        let provider = WmtsProvider::new(http_client, wmts_config, calibration.zoom())
            .map_err(CliError::ProviderSetup)?;
        let cache = DiskTileCache::new(&self.config.cache.directory, &settings.map_name);

        info!(
            map = %settings.map_name,
            layer = %settings.layer,
            cache = %self.config.cache.directory.display(),
            "Provider ready"
        );
        Ok(MapOrchestrator::new(provider, cache, calibration))
    }

    /// Renderer for scale bar labels.
    ///
    /// Uses `font` if given, else the configured font. Without a usable font
    /// the bar is drawn without labels.
    pub fn text_renderer(&self, font: Option<&Path>) -> Box<dyn TextRenderer> {
        let output = &self.config.output;
        let Some(path) = font.or(output.font.as_deref()) else {
            warn!("No font configured, scale bar labels will be omitted");
            println!("No font configured (--font or [output] font): scale bar drawn without labels");
            return Box::new(NullTextRenderer);
        };

        match FontTextRenderer::from_file(path, output.font_size) {
            Ok(renderer) => {
                info!(font = %path.display(), size_px = output.font_size, "Loaded label font");
                Box::new(renderer)
            }
            Err(e) => {
                warn!(error = %e, "Font unavailable, scale bar labels will be omitted");
                println!("Warning: {} - scale bar drawn without labels", e);
                Box::new(NullTextRenderer)
            }
        }
    }
}

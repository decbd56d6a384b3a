//! Cache management CLI commands.

use clap::Subcommand;
use mapmosaic::cache::{clear_tile_cache, tile_cache_stats};
use mapmosaic::config::ConfigFile;

use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the tile cache, removing all downloaded tiles
    Clear,
    /// Show tile cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let cache_dir = &config.cache.directory;

    match action {
        CacheAction::Clear => {
            println!("Clearing tile cache at: {}", cache_dir.display());
            let removed = clear_tile_cache(cache_dir)?;
            println!("Deleted {}", removed);
        }
        CacheAction::Stats => {
            println!("Tile cache: {}", cache_dir.display());
            let stats = tile_cache_stats(cache_dir)?;
            println!("  {}", stats);
        }
    }
    Ok(())
}

//! MapMosaic CLI - Command-line interface
//!
//! Builds printable maps from WMTS tiles: `mapmosaic download` plans the
//! area, fetches the missing tiles and writes one JPEG with a scale bar.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::download::DownloadArgs;

#[derive(Parser)]
#[command(name = "mapmosaic")]
#[command(version, about = "Printable maps stitched from WMTS tiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the tiles around a point and assemble them into one map
    Download(DownloadArgs),
    /// Create ~/.mapmosaic/config.ini with default settings
    Init,
    /// Manage the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Download(args) => commands::download::run(args),
        Commands::Init => commands::init::run(),
        Commands::Cache { action } => commands::cache::run(action),
    };

    if let Err(e) = result {
        e.exit();
    }
}

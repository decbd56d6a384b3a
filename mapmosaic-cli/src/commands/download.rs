//! Download command - build one printable map.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use mapmosaic::area::{AreaRequest, DEFAULT_PAPER_HEIGHT_CM, DEFAULT_PAPER_WIDTH_CM};
use mapmosaic::coord::GeoPoint;
use mapmosaic::orchestrator::{plan_map, MapError, MapPlan, TileOutcome};
use mapmosaic::tile::map_file_name;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Longitude of the map center in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Latitude of the map center in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Paper width in centimeters
    #[arg(long, default_value_t = DEFAULT_PAPER_WIDTH_CM)]
    pub width: f64,

    /// Paper height in centimeters
    #[arg(long, default_value_t = DEFAULT_PAPER_HEIGHT_CM)]
    pub height: f64,

    /// Opposite longitude; the map spans lon..to-lon instead of --width
    #[arg(long = "to-lon", alias = "toLon", allow_negative_numbers = true)]
    pub to_lon: Option<f64>,

    /// Opposite latitude; the map spans lat..to-lat instead of --height
    #[arg(long = "to-lat", alias = "toLat", allow_negative_numbers = true)]
    pub to_lat: Option<f64>,

    /// Download tiles again even if they are cached
    #[arg(long)]
    pub force: bool,

    /// Only print the planned area, do not download anything
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the finished map (default: [output] directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// TrueType/OpenType font for scale bar labels (default: [output] font)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Do not draw the scale bar
    #[arg(long)]
    pub no_scale: bool,

    /// JPEG quality 1-100 (default: [output] jpeg_quality)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// API key for the tile service (default: [provider] api_key)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Log debug messages to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl DownloadArgs {
    /// The area request described by the arguments.
    pub fn area_request(&self) -> AreaRequest {
        let mut request =
            AreaRequest::centered(GeoPoint::new(self.lon, self.lat), self.width, self.height);
        if let Some(to_lon) = self.to_lon {
            request = request.with_to_lon(to_lon);
        }
        if let Some(to_lat) = self.to_lat {
            request = request.with_to_lat(to_lat);
        }
        request
    }
}

/// Run the download command.
pub fn run(args: DownloadArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("download");
    let config = runner.config();

    let request = args.area_request();
    let calibration = runner.calibration();
    let plan = plan_map(&request, &calibration)?;
    print_plan(&plan);

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    if args.dry_run {
        let name = map_file_name(
            &config.provider.map_name,
            calibration.zoom(),
            &plan.effective.tiles,
        );
        println!();
        println!("Dry run: would write {}", output_dir.join(name).display());
        return Ok(());
    }

    let orchestrator = runner.create_orchestrator(args.api_key.clone())?;

    // Download
    println!();
    let progress = ProgressBar::new(plan.tile_count());
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tiles {msg}")
    {
        progress.set_style(style.progress_chars("##-"));
    }
    let stats = orchestrator
        .fetch_tiles(&plan, args.force, |p| {
            let origin = match p.outcome {
                TileOutcome::Fetched(_) => "downloaded",
                TileOutcome::Skipped => "cached",
            };
            progress.set_message(format!("{} ({})", p.index, origin));
            progress.set_position(p.completed);
        })
        .inspect_err(|_| progress.abandon())?;
    progress.finish_and_clear();
    println!("{}", stats);

    // Assemble
    println!("Assembling {} tiles...", plan.tile_count());
    let mut mosaic = orchestrator.assemble(&plan)?;

    if !args.no_scale {
        let renderer = runner.text_renderer(args.font.as_deref());
        orchestrator.annotate(&mut mosaic, &plan, renderer.as_ref())?;
    }

    // Save
    std::fs::create_dir_all(&output_dir).map_err(|error| CliError::OutputDir {
        path: output_dir.clone(),
        error,
    })?;
    let output = orchestrator.output_path(&plan, &output_dir);
    let quality = args.quality.unwrap_or(config.output.jpeg_quality);
    mosaic
        .save_jpeg(&output, quality)
        .map_err(MapError::from)?;

    info!(path = %output.display(), "Map complete");
    println!(
        "Saved {} ({} x {} px)",
        output.display(),
        mosaic.width(),
        mosaic.height()
    );
    Ok(())
}

fn print_plan(plan: &MapPlan) {
    println!("{}", plan.required);
    println!();
    println!("{}", plan.effective);
    println!();
    println!(
        "Real scale 1:{:.0} at latitude {:.5}, {:.3} m per pixel",
        plan.scale.real_scale_denominator(),
        plan.scale.latitude_deg(),
        plan.scale.terrain_meters_per_pixel()
    );
}

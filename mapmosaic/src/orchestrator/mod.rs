//! Map orchestration
//!
//! Runs the pipeline for one request: plan the area, download the missing
//! tiles into the cache, assemble them into a mosaic and draw the scale bar.
//! Each step is a separate call so the caller can report between them and
//! stop after planning for a dry run.

mod types;

pub use types::{FetchProgress, FetchStats, MapError, MapPlan, TileOutcome};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::area::{resolve_area, AreaRequest};
use crate::cache::{CacheError, TileCache};
use crate::calibration::Calibration;
use crate::mosaic::{decode_tile, Mosaic, MosaicAssembler, MosaicError};
use crate::provider::{Provider, ProviderError};
use crate::scale::{ScaleBar, ScaleBarLayout, TextRenderer};
use crate::tile::{compute_effective_bounding_box, map_file_name};

/// Resolves the required and effective areas of a request.
///
/// Needs only the calibration, so a request can be planned (and reported)
/// before any provider is set up.
pub fn plan_map(request: &AreaRequest, calibration: &Calibration) -> Result<MapPlan, MapError> {
    let scale = calibration.scale_context(request.scale_latitude())?;
    let required = resolve_area(request, &scale, calibration)?;
    let effective = compute_effective_bounding_box(&required.bbox, &scale, calibration)?;

    info!(
        cols = %effective.tiles.cols(),
        rows = %effective.tiles.rows(),
        tiles = effective.tiles.tile_count(),
        real_scale = scale.real_scale_denominator(),
        "Planned map"
    );

    Ok(MapPlan {
        scale,
        required,
        effective,
    })
}

/// Drives a [`Provider`] and a [`TileCache`] through the map pipeline.
pub struct MapOrchestrator<P, C> {
    provider: P,
    cache: C,
    calibration: Calibration,
    scale_bar: ScaleBar,
}

impl<P: Provider, C: TileCache> MapOrchestrator<P, C> {
    /// Creates an orchestrator with the default scale bar.
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of tiles missing from the cache
    /// * `cache` - Where tiles are stored between download and assembly
    /// * `calibration` - Tile matrix the provider serves
    pub fn new(provider: P, cache: C, calibration: Calibration) -> Self {
        Self {
            provider,
            cache,
            calibration,
            scale_bar: ScaleBar::default(),
        }
    }

    /// Replaces the scale bar drawn by [`annotate`](Self::annotate).
    pub fn with_scale_bar(mut self, scale_bar: ScaleBar) -> Self {
        self.scale_bar = scale_bar;
        self
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolves the required and effective areas of a request.
    pub fn plan(&self, request: &AreaRequest) -> Result<MapPlan, MapError> {
        plan_map(request, &self.calibration)
    }

    /// Downloads every tile of the plan that the cache does not have.
    ///
    /// Tiles are requested column by column, north to south within a
    /// column. With `force`, cached tiles are downloaded again. The first
    /// failure stops the step; tiles stored before it stay cached.
    ///
    /// # Arguments
    ///
    /// * `plan` - Result of [`plan`](Self::plan)
    /// * `force` - Ignore the cache and fetch every tile
    /// * `on_progress` - Called once per tile, after it is handled
    pub fn fetch_tiles<F>(
        &self,
        plan: &MapPlan,
        force: bool,
        mut on_progress: F,
    ) -> Result<FetchStats, MapError>
    where
        F: FnMut(&FetchProgress),
    {
        let zoom = self.calibration.zoom();
        let total = plan.tile_count();
        let mut stats = FetchStats::default();

        for index in plan.effective.tiles.iter_column_major() {
            let outcome = if !force && self.cache.contains(index, zoom) {
                debug!(col = index.col, row = index.row, "Tile already cached");
                stats.skipped += 1;
                TileOutcome::Skipped
            } else {
                let bytes = self
                    .provider
                    .fetch_tile(index, zoom)
                    .map_err(|source| MapError::Fetch { index, source })?;
                // Quota and error pages come back as 200 too; keep them out of the cache
                decode_tile(index, &bytes).map_err(|e| MapError::Fetch {
                    index,
                    source: ProviderError::InvalidResponse(e.to_string()),
                })?;
                self.cache.store(index, zoom, &bytes)?;
                stats.fetched += 1;
                stats.bytes += bytes.len() as u64;
                TileOutcome::Fetched(bytes.len())
            };

            on_progress(&FetchProgress {
                index,
                outcome,
                completed: stats.total(),
                total,
            });
        }

        info!(
            fetched = stats.fetched,
            skipped = stats.skipped,
            bytes = stats.bytes,
            provider = self.provider.name(),
            "Tiles downloaded"
        );
        Ok(stats)
    }

    /// Assembles the cached tiles of the plan into one mosaic.
    ///
    /// Every tile must be cached and decode to the calibrated tile size.
    pub fn assemble(&self, plan: &MapPlan) -> Result<Mosaic, MapError> {
        let zoom = self.calibration.zoom();
        let tile_size = self.calibration.tile_size_px();
        let assembler = MosaicAssembler::with_expected_tile_size(tile_size, tile_size);

        let mosaic = assembler.assemble(&plan.effective.tiles, |index| {
            let bytes = self.cache.load(index, zoom).map_err(|e| match e {
                CacheError::NotCached { .. } => MosaicError::MissingTile {
                    index,
                    reason: "not in the tile cache".to_string(),
                },
                CacheError::Io { .. } => MosaicError::MissingTile {
                    index,
                    reason: e.to_string(),
                },
            })?;
            decode_tile(index, &bytes)
        })?;

        Ok(mosaic)
    }

    /// Draws the scale bar at the resolution of the plan.
    pub fn annotate(
        &self,
        mosaic: &mut Mosaic,
        plan: &MapPlan,
        renderer: &dyn TextRenderer,
    ) -> Result<ScaleBarLayout, MapError> {
        let layout = self
            .scale_bar
            .draw(mosaic, plan.scale.terrain_meters_per_pixel(), renderer)?;
        debug!(
            length_px = layout.length_px,
            reference_m = self.scale_bar.reference_distance_m(),
            "Drew scale bar"
        );
        Ok(layout)
    }

    /// Path of the finished map inside `directory`.
    pub fn output_path(&self, plan: &MapPlan, directory: &Path) -> PathBuf {
        directory.join(map_file_name(
            self.provider.name(),
            self.calibration.zoom(),
            &plan.effective.tiles,
        ))
    }
}

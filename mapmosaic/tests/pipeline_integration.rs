//! Integration tests for the full map pipeline.
//!
//! These tests drive the real WMTS provider over a canned HTTP client and a
//! disk cache in a temporary directory:
//! - area planning at a real location
//! - tile download with cache reuse
//! - mosaic assembly, scale bar drawing and JPEG output
//!
//! Run with: `cargo test --test pipeline_integration`

use std::cell::RefCell;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use mapmosaic::area::AreaRequest;
use mapmosaic::cache::{tile_cache_stats, DiskTileCache, TileCache};
use mapmosaic::calibration::Calibration;
use mapmosaic::coord::{GeoPoint, TileIndex};
use mapmosaic::mosaic::Mosaic;
use mapmosaic::orchestrator::{MapOrchestrator, TileOutcome};
use mapmosaic::provider::{HttpClient, ProviderError, WmtsConfig, WmtsProvider};
use mapmosaic::scale::NullTextRenderer;

// ============================================================================
// Helper Functions
// ============================================================================

/// Color of a tile in the checkerboard served by [`CheckerboardServer`].
fn tile_color(index: TileIndex) -> Rgb<u8> {
    Rgb([
        if index.col % 2 == 0 { 30 } else { 220 },
        if index.row % 2 == 0 { 30 } else { 220 },
        120,
    ])
}

fn query_value(url: &str, key: &str) -> Option<u32> {
    let query = url.split('?').nth(1)?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
}

/// Answers GetTile requests with solid JPEG tiles colored by position.
#[derive(Default)]
struct CheckerboardServer {
    urls: RefCell<Vec<String>>,
}

impl HttpClient for CheckerboardServer {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.urls.borrow_mut().push(url.to_string());

        let col = query_value(url, "TILECOL")
            .ok_or_else(|| ProviderError::InvalidResponse("no TILECOL".to_string()))?;
        let row = query_value(url, "TILEROW")
            .ok_or_else(|| ProviderError::InvalidResponse("no TILEROW".to_string()))?;

        let tile = RgbImage::from_pixel(256, 256, tile_color(TileIndex::new(col, row)));
        let mut bytes = Vec::new();
        Mosaic::from_image(tile)
            .write_jpeg(&mut bytes, 95)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(bytes)
    }
}

fn test_config() -> WmtsConfig {
    WmtsConfig {
        map_name: "TEST".to_string(),
        endpoint: "https://tiles.example.test/{api_key}/wmts".to_string(),
        api_key: Some("key".to_string()),
        ..WmtsConfig::default()
    }
}

fn close(a: Rgb<u8>, b: Rgb<u8>) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(x, y)| (*x as i32 - *y as i32).abs() <= 12)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_chamechaude_small_sheet_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cache_dir = dir.path().join("cache");
    let calibration = Calibration::default();
    let provider =
        WmtsProvider::new(CheckerboardServer::default(), test_config(), calibration.zoom()).unwrap();
    let cache = DiskTileCache::new(&cache_dir, "TEST");
    let orchestrator = MapOrchestrator::new(provider, cache, calibration);

    let request = AreaRequest::centered(GeoPoint::new(5.78868, 45.28787), 8.0, 6.0);
    let plan = orchestrator.plan(&request).unwrap();
    let tiles = plan.effective.tiles;

    // Download
    let mut fetched = 0;
    let stats = orchestrator
        .fetch_tiles(&plan, false, |progress| {
            if let TileOutcome::Fetched(_) = progress.outcome {
                fetched += 1;
            }
        })
        .unwrap();
    assert_eq!(stats.fetched, tiles.tile_count());
    assert_eq!(fetched, tiles.tile_count());
    assert_eq!(
        tile_cache_stats(&cache_dir).unwrap().tile_count as u64,
        tiles.tile_count()
    );

    // Every URL carries the key and the calibrated zoom
    for url in orchestrator.provider_urls() {
        assert!(url.starts_with("https://tiles.example.test/key/wmts?SERVICE=WMTS"));
        assert!(url.contains("TILEMATRIX=15&"));
    }

    // Assembly
    let mut mosaic = orchestrator.assemble(&plan).unwrap();
    assert_eq!(mosaic.width(), tiles.cols().count() * 256);
    assert_eq!(mosaic.height(), tiles.rows().count() * 256);

    // Tile placement: the center of each tile has that tile's color
    for index in tiles.iter() {
        let x = (index.col - tiles.cols().start()) * 256 + 128;
        let y = (index.row - tiles.rows().start()) * 256 + 128;
        let pixel = *mosaic.image().get_pixel(x, y);
        assert!(
            close(pixel, tile_color(index)),
            "tile {} has color {:?}",
            index,
            pixel
        );
    }

    // Annotation and output
    orchestrator
        .annotate(&mut mosaic, &plan, &NullTextRenderer)
        .unwrap();
    let output = orchestrator.output_path(&plan, dir.path());
    mosaic.save_jpeg(&output, 90).unwrap();

    let written = image::open(&output).unwrap();
    assert_eq!(written.width(), tiles.cols().count() * 256);
    assert_eq!(written.height(), tiles.rows().count() * 256);
    assert!(output
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("TEST_zoom15_rows"));
}

#[test]
fn test_second_run_uses_cache() {
    let dir = TempDir::new().unwrap();
    let calibration = Calibration::default();
    let request = AreaRequest::centered(GeoPoint::new(2.3522, 48.8566), 5.0, 5.0);

    let first = MapOrchestrator::new(
        WmtsProvider::new(CheckerboardServer::default(), test_config(), 15).unwrap(),
        DiskTileCache::new(dir.path(), "TEST"),
        calibration,
    );
    let plan = first.plan(&request).unwrap();
    first.fetch_tiles(&plan, false, |_| {}).unwrap();

    let second = MapOrchestrator::new(
        WmtsProvider::new(CheckerboardServer::default(), test_config(), 15).unwrap(),
        DiskTileCache::new(dir.path(), "TEST"),
        calibration,
    );
    let stats = second.fetch_tiles(&plan, false, |_| {}).unwrap();

    assert_eq!(stats.fetched, 0);
    assert_eq!(stats.skipped, plan.tile_count());
    assert!(second.provider_urls().is_empty());
    assert!(second.cache().contains(plan.effective.tiles.first(), 15));
    assert!(second.assemble(&plan).is_ok());
}

#[test]
fn test_explicit_corners_single_column() {
    let dir = TempDir::new().unwrap();
    let orchestrator = MapOrchestrator::new(
        WmtsProvider::new(CheckerboardServer::default(), test_config(), 15).unwrap(),
        DiskTileCache::new(dir.path(), "TEST"),
        Calibration::default(),
    );

    let request = AreaRequest::a4(GeoPoint::new(5.78868, 45.28787))
        .with_to_lon(5.78868)
        .with_to_lat(45.29);
    let plan = orchestrator.plan(&request).unwrap();

    assert_eq!(plan.effective.tiles.cols().count(), 1);
    assert!(plan.effective.tiles.rows().count() >= 1);

    orchestrator.fetch_tiles(&plan, false, |_| {}).unwrap();
    let mosaic = orchestrator.assemble(&plan).unwrap();
    assert_eq!(mosaic.width(), 256);
}

/// Access to the URLs requested through the orchestrator's provider.
trait ProviderUrls {
    fn provider_urls(&self) -> Vec<String>;
}

impl<C: TileCache> ProviderUrls for MapOrchestrator<WmtsProvider<CheckerboardServer>, C> {
    fn provider_urls(&self) -> Vec<String> {
        self.provider().http_client().urls.borrow().clone()
    }
}

//! MapMosaic - printable maps assembled from WMTS tiles
//!
//! This library turns a geographic area (a center point plus a paper size,
//! or explicit corner coordinates) into one georeferenced raster stitched
//! from the square tiles of a Web Map Tile Service.
//!
//! # Pipeline
//!
//! ```text
//! AreaRequest ──► area::resolve_area ──► tile::compute_effective_bounding_box
//!                                                   │
//!                          provider + cache ◄───────┘ (one fetch per TileIndex)
//!                                  │
//!                                  ▼
//!                mosaic::MosaicAssembler ──► scale::ScaleBar ──► JPEG on disk
//! ```
//!
//! The geometry (projection, area resolution, tile grid) is pure and driven by
//! an immutable [`calibration::Calibration`]. Fetching and caching sit behind
//! the [`provider::Provider`] and [`cache::TileCache`] traits, and
//! [`orchestrator::MapOrchestrator`] wires everything together.

pub mod area;
pub mod cache;
pub mod calibration;
pub mod config;
pub mod coord;
pub mod logging;
pub mod mosaic;
pub mod orchestrator;
pub mod provider;
pub mod scale;
pub mod tile;

/// Crate version, reported by the CLI at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

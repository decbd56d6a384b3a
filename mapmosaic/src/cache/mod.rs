//! Tile cache
//!
//! Downloaded tiles are kept on disk so that a later run over an
//! overlapping area only fetches what is new.

mod disk;
mod traits;

pub use disk::{clear_tile_cache, tile_cache_stats, DiskTileCache};
pub use traits::{CacheError, CacheStats, TileCache};

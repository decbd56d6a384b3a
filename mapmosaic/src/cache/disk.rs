//! On-disk tile cache.
//!
//! One file per tile, named `{map}_zoom{z}_row{row}_col{col}.jpeg`, flat in
//! the cache directory. Writes go to a `.part` sibling that is renamed into
//! place once complete, so an interrupted write never leaves a truncated
//! tile behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::traits::{CacheError, CacheStats, TileCache};
use crate::coord::TileIndex;
use crate::tile::{tile_file_name, JPEG_EXTENSION};

/// Suffix of in-progress writes.
const PARTIAL_EXTENSION: &str = "part";

/// [`TileCache`] storing tiles as files in one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskTileCache {
    directory: PathBuf,
    map_name: String,
}

impl DiskTileCache {
    /// Creates a cache for `map_name` tiles under `directory`.
    ///
    /// The directory is created on the first write.
    pub fn new(directory: impl Into<PathBuf>, map_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            map_name: map_name.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Path of the file holding one tile.
    pub fn path_for(&self, index: TileIndex, zoom: u8) -> PathBuf {
        self.directory
            .join(tile_file_name(&self.map_name, zoom, index))
    }
}

impl TileCache for DiskTileCache {
    fn contains(&self, index: TileIndex, zoom: u8) -> bool {
        self.path_for(index, zoom).is_file()
    }

    fn load(&self, index: TileIndex, zoom: u8) -> Result<Vec<u8>, CacheError> {
        let path = self.path_for(index, zoom);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CacheError::NotCached { index, zoom },
            _ => CacheError::io(&path, e),
        })
    }

    fn store(&self, index: TileIndex, zoom: u8, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.directory).map_err(|e| CacheError::io(&self.directory, e))?;

        let path = self.path_for(index, zoom);
        let partial = path.with_extension(format!("{}.{}", JPEG_EXTENSION, PARTIAL_EXTENSION));

        fs::write(&partial, bytes).map_err(|e| CacheError::io(&partial, e))?;
        fs::rename(&partial, &path).map_err(|e| CacheError::io(&path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Cached tile");
        Ok(())
    }
}

/// Whether `path` is a tile file written by [`DiskTileCache`], or a partial
/// write of one. Finished maps and other JPEGs sharing the directory are not.
fn is_cache_entry(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name
        .strip_suffix(PARTIAL_EXTENSION)
        .and_then(|n| n.strip_suffix('.'))
        .unwrap_or(name);
    let Some(stem) = name
        .strip_suffix(JPEG_EXTENSION)
        .and_then(|n| n.strip_suffix('.'))
    else {
        return false;
    };

    // Map names may contain underscores, so split from the right
    let mut parts = stem.rsplitn(4, '_');
    let numbered = |part: Option<&str>, prefix: &str| {
        part.and_then(|p| p.strip_prefix(prefix))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    };
    numbered(parts.next(), "col")
        && numbered(parts.next(), "row")
        && numbered(parts.next(), "zoom")
        && parts.next().is_some_and(|map| !map.is_empty())
}

fn cache_entries(directory: &Path) -> Result<Vec<(PathBuf, u64)>, CacheError> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CacheError::io(directory, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io(directory, e))?;
        let path = entry.path();
        if !is_cache_entry(&path) {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| CacheError::io(&path, e))?;
        if metadata.is_file() {
            files.push((path, metadata.len()));
        }
    }
    Ok(files)
}

/// Counts the tiles stored in a cache directory.
///
/// A missing directory is an empty cache.
pub fn tile_cache_stats(directory: &Path) -> Result<CacheStats, CacheError> {
    let files = cache_entries(directory)?;
    Ok(CacheStats {
        tile_count: files.len(),
        total_bytes: files.iter().map(|(_, size)| size).sum(),
    })
}

/// Removes every cached tile (and leftover partial write) from a directory.
///
/// Other files are left alone. Returns what was removed.
pub fn clear_tile_cache(directory: &Path) -> Result<CacheStats, CacheError> {
    let files = cache_entries(directory)?;
    let mut removed = CacheStats::default();

    for (path, size) in files {
        fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))?;
        removed.tile_count += 1;
        removed.total_bytes += size;
    }

    info!(
        directory = %directory.display(),
        tiles = removed.tile_count,
        bytes = removed.total_bytes,
        "Cleared tile cache"
    );
    Ok(removed)
}

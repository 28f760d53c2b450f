//! Archive error and metadata types

use std::path::PathBuf;

use thiserror::Error;

use crate::region::{BoundingBox, Region};

/// Tile image format recorded in the archive metadata.
pub const TILE_FORMAT: &str = "png";

/// Edge length in pixels of the upstream tiles.
pub const TILE_SIZE: u32 = 512;

/// MBTiles layer type.
pub const LAYER_TYPE: &str = "baselayer";

/// Archive schema version written to metadata.
pub const ARCHIVE_VERSION: &str = "1.0";

/// File extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "mbtiles";

/// Errors raised by the archive writer and reader.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// SQLite rejected a statement or transaction.
    #[error("SQLite error on {path}: {source}")]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Filesystem operation on the archive failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    pub(crate) fn sqlite(path: &std::path::Path) -> impl FnOnce(rusqlite::Error) -> Self + '_ {
        move |source| ArchiveError::Sqlite {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Descriptive rows stored in the `metadata` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveMetadata {
    pub name: String,
    pub bounds: BoundingBox,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// AIRAC cycle the tiles were fetched for.
    pub cycle: String,
}

impl ArchiveMetadata {
    pub fn for_region(region: &Region, cycle: impl Into<String>) -> Self {
        Self {
            name: region.id().to_string(),
            bounds: *region.bbox(),
            min_zoom: region.zoom().min,
            max_zoom: region.zoom().max,
            cycle: cycle.into(),
        }
    }

    /// `(name, value)` pairs in insertion order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("format", TILE_FORMAT.to_string()),
            ("type", LAYER_TYPE.to_string()),
            ("version", ARCHIVE_VERSION.to_string()),
            ("bounds", self.bounds.to_string()),
            ("minzoom", self.min_zoom.to_string()),
            ("maxzoom", self.max_zoom.to_string()),
            ("tile_size", TILE_SIZE.to_string()),
            ("description", format!("AIRAC cycle {}", self.cycle)),
        ]
    }
}

/// File name of the archive for one region and cycle.
///
/// ```
/// use aerotiles::archive::archive_file_name;
///
/// assert_eq!(archive_file_name("LS", "2502", 7, 12), "LS_2502_zoom7-12.mbtiles");
/// ```
pub fn archive_file_name(prefix: &str, cycle: &str, min_zoom: u8, max_zoom: u8) -> String {
    format!(
        "{}_{}_zoom{}-{}.{}",
        prefix, cycle, min_zoom, max_zoom, ARCHIVE_EXTENSION
    )
}

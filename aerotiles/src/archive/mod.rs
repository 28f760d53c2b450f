//! MBTiles archive storage
//!
//! An archive is a SQLite file with a `metadata(name, value)` table and a
//! `tiles(zoom_level, tile_column, tile_row, tile_data)` table keyed by a
//! unique index. Rows are stored south-up (TMS); the rest of the crate uses
//! north-up XYZ rows and converts only when writing.

mod reader;
mod types;
mod writer;

pub use reader::ArchiveReader;
pub use types::{
    archive_file_name, ArchiveError, ArchiveMetadata, ARCHIVE_EXTENSION, ARCHIVE_VERSION,
    LAYER_TYPE, TILE_FORMAT, TILE_SIZE,
};
pub use writer::ArchiveWriter;

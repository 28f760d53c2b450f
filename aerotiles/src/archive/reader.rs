//! Read-only access to a finished archive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::types::ArchiveError;

/// Read-only view of an MBTiles archive.
#[derive(Debug)]
pub struct ArchiveReader {
    conn: Connection,
    path: PathBuf,
}

impl ArchiveReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(ArchiveError::sqlite(&path))?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored tiles.
    pub fn tile_count(&self) -> Result<u64, ArchiveError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(ArchiveError::sqlite(&self.path))
    }

    /// Tile payload at a TMS (south-up) address.
    pub fn get_tile(&self, zoom: u8, col: u32, tms_row: u32) -> Result<Option<Vec<u8>>, ArchiveError> {
        self.conn
            .query_row(
                "SELECT tile_data FROM tiles \
                 WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
                params![zoom, col, tms_row],
                |row| row.get(0),
            )
            .optional()
            .map_err(ArchiveError::sqlite(&self.path))
    }

    /// Every stored `(zoom, col, tms_row)` in ascending order.
    pub fn tile_keys(&self) -> Result<Vec<(u8, u32, u32)>, ArchiveError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT zoom_level, tile_column, tile_row FROM tiles \
                 ORDER BY zoom_level, tile_column, tile_row",
            )
            .map_err(ArchiveError::sqlite(&self.path))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(ArchiveError::sqlite(&self.path))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(ArchiveError::sqlite(&self.path))
    }

    /// Metadata table as a name to value map.
    pub fn metadata(&self) -> Result<BTreeMap<String, String>, ArchiveError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM metadata")
            .map_err(ArchiveError::sqlite(&self.path))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(ArchiveError::sqlite(&self.path))?;
        rows.collect::<Result<BTreeMap<_, _>, _>>()
            .map_err(ArchiveError::sqlite(&self.path))
    }
}

//! Single-writer MBTiles assembly.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::fetch::FetchedTile;

use super::types::{ArchiveError, ArchiveMetadata};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS metadata (name TEXT, value TEXT);
    CREATE TABLE IF NOT EXISTS tiles (
        zoom_level INTEGER,
        tile_column INTEGER,
        tile_row INTEGER,
        tile_data BLOB
    );
    CREATE UNIQUE INDEX IF NOT EXISTS tile_index ON tiles (zoom_level, tile_column, tile_row);
";

const INSERT_TILE: &str = "INSERT OR REPLACE INTO tiles (zoom_level, tile_column, tile_row, tile_data) \
     VALUES (?1, ?2, ?3, ?4)";

/// Owns the archive file while it is being assembled.
///
/// Not `Clone`: exactly one writer exists per archive. The file is either
/// finalized with [`close`](Self::close) or removed with
/// [`discard`](Self::discard).
#[derive(Debug)]
pub struct ArchiveWriter {
    conn: Connection,
    path: PathBuf,
    written: u64,
}

impl ArchiveWriter {
    /// Creates a fresh archive at `path` with schema and metadata.
    ///
    /// Missing parent directories are created and an existing file is
    /// replaced.
    pub fn open(path: impl AsRef<Path>, metadata: &ArchiveMetadata) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(ArchiveError::io(parent))?;
        }
        if path.exists() {
            debug!(path = %path.display(), "Replacing existing archive");
            fs::remove_file(&path).map_err(ArchiveError::io(&path))?;
        }

        let mut conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(ArchiveError::sqlite(&path))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL;")
            .map_err(ArchiveError::sqlite(&path))?;

        let tx = conn.transaction().map_err(ArchiveError::sqlite(&path))?;
        tx.execute_batch(SCHEMA).map_err(ArchiveError::sqlite(&path))?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO metadata (name, value) VALUES (?1, ?2)")
                .map_err(ArchiveError::sqlite(&path))?;
            for (name, value) in metadata.rows() {
                stmt.execute(params![name, value])
                    .map_err(ArchiveError::sqlite(&path))?;
            }
        }
        tx.commit().map_err(ArchiveError::sqlite(&path))?;

        info!(path = %path.display(), name = %metadata.name, "Archive opened");

        Ok(Self {
            conn,
            path,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tiles committed so far.
    pub fn tiles_written(&self) -> u64 {
        self.written
    }

    /// Writes the successful tiles of `tiles` in one transaction.
    ///
    /// Rows are converted to TMS here. Failed fetches are skipped. On error
    /// nothing from this batch is kept.
    ///
    /// # Returns
    ///
    /// The number of tiles written.
    pub fn write_batch(&mut self, tiles: &[FetchedTile]) -> Result<usize, ArchiveError> {
        let path = &self.path;
        let tx = self.conn.transaction().map_err(ArchiveError::sqlite(path))?;

        let mut count = 0;
        {
            let mut stmt = tx
                .prepare_cached(INSERT_TILE)
                .map_err(ArchiveError::sqlite(path))?;
            for fetched in tiles {
                let Some(data) = fetched.data() else {
                    continue;
                };
                let tile = &fetched.tile;
                stmt.execute(params![tile.zoom, tile.col, tile.tms_row(), data])
                    .map_err(ArchiveError::sqlite(path))?;
                count += 1;
            }
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().map_err(ArchiveError::sqlite(path))?;

        self.written += count as u64;
        debug!(batch = count, total = self.written, "Batch committed");
        Ok(count)
    }

    /// Finalizes the archive and returns its path.
    pub fn close(self) -> Result<PathBuf, ArchiveError> {
        let Self {
            conn,
            path,
            written,
        } = self;
        conn.close()
            .map_err(|(_, source)| ArchiveError::Sqlite {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), tiles = written, "Archive finalized");
        Ok(path)
    }

    /// Closes and deletes the archive.
    pub fn discard(self) {
        let Self { conn, path, .. } = self;
        if let Err((_, e)) = conn.close() {
            warn!(path = %path.display(), error = %e, "Failed to close discarded archive");
        }
        match fs::remove_file(&path) {
            Ok(()) => info!(path = %path.display(), "Archive discarded"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove discarded archive"),
        }
    }
}

//! Read-only MBTiles adapter.
//!
//! An MBTiles file is an SQLite database with two tables:
//!
//! - `metadata(name TEXT, value TEXT)`
//! - `tiles(zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB)`
//!
//! Each [`MBTiles`] owns one read-only connection. Dropping it closes the file.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, trace};

use crate::error::ArchiveError;

use super::{ArchiveOpener, Metadata, TileArchive};

/// File extension appended to tileset names.
pub const MBTILES_EXTENSION: &str = "mbtiles";

const TILE_QUERY: &str =
    "SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3";

/// An open MBTiles archive.
pub struct MBTiles {
    path: PathBuf,
    conn: Connection,
    metadata: Metadata,
}

impl MBTiles {
    /// Open the MBTiles file at `path` read-only.
    ///
    /// Fails with [`ArchiveError::InvalidFile`] when the file is not an SQLite
    /// database, lacks the `metadata` or `tiles` table, or has no `format` entry.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        debug!("Opening MBTiles {:?}", path);

        if !path.is_file() {
            return Err(ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a file", path.display()),
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let invalid = |reason: String| ArchiveError::InvalidFile {
            path: path.display().to_string(),
            reason,
        };

        let metadata = read_metadata(&conn).map_err(|e| invalid(e.to_string()))?;

        // Preparing the lookup validates the tile table's shape up front.
        conn.prepare(TILE_QUERY).map_err(|e| invalid(e.to_string()))?;

        if !metadata.contains_key("format") {
            return Err(invalid("metadata has no format entry".to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            conn,
            metadata,
        })
    }
}

/// Read the metadata table into a map.
///
/// Non-text values are rendered as strings; NULL values are skipped.
fn read_metadata(conn: &Connection) -> Result<Metadata, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT name, value FROM metadata")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Value>(1)?))
    })?;

    let mut metadata = Metadata::new();
    for row in rows {
        let (name, value) = row?;
        let value = match value {
            Value::Null => continue,
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(s) => s,
            Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
        };
        metadata.insert(name, value);
    }

    Ok(metadata)
}

impl TileArchive for MBTiles {
    fn path(&self) -> &Path {
        &self.path
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn get(&self, x: u32, y: u32, z: u8) -> Result<Option<Bytes>, ArchiveError> {
        trace!("Reading tile z={} x={} row={} from {:?}", z, x, y, self.path);

        let data = self
            .conn
            .query_row(TILE_QUERY, params![z, x, y], |row| row.get::<_, Vec<u8>>(0))
            .optional()?;

        Ok(data.map(Bytes::from))
    }

    fn zoom_range(&self) -> Result<Option<(u8, u8)>, ArchiveError> {
        debug!("Scanning zoom levels of {:?}", self.path);

        let (min, max): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(zoom_level), MAX(zoom_level) FROM tiles",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (Some(min), Some(max)) = (min, max) else {
            return Ok(None);
        };

        let to_zoom = |z: i64| {
            u8::try_from(z).map_err(|_| ArchiveError::InvalidFile {
                path: self.path.display().to_string(),
                reason: format!("zoom level {} out of range", z),
            })
        };

        Ok(Some((to_zoom(min)?, to_zoom(max)?)))
    }
}

impl std::fmt::Debug for MBTiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MBTiles")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// [`ArchiveOpener`] producing [`MBTiles`] archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct MBTilesOpener;

impl ArchiveOpener for MBTilesOpener {
    type Archive = MBTiles;

    fn open(&self, path: &Path) -> Result<Self::Archive, ArchiveError> {
        MBTiles::open(path)
    }
}

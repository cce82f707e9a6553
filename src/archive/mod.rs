//! Tile archive adapter.
//!
//! The rest of the crate talks to tile stores only through the two traits in
//! this module:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            TilesetLocator               │
//! └────────────────────┬────────────────────┘
//!                      │ open(path)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          ArchiveOpener Trait            │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           TileArchive Trait             │
//! │  (metadata, get, zoom_range, path)      │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     MBTiles (read-only SQLite file)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Archives are opened per request and closed when dropped.

mod mbtiles;

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;

use crate::error::ArchiveError;

pub use mbtiles::{MBTiles, MBTilesOpener, MBTILES_EXTENSION};

/// Raw key/value metadata as stored in the archive.
pub type Metadata = BTreeMap<String, String>;

/// Read access to one open tile archive.
///
/// Row coordinates passed to [`TileArchive::get`] are in the archive's native
/// TMS orientation (row 0 is the southernmost row).
pub trait TileArchive: Send {
    /// Filesystem path the archive was opened from.
    fn path(&self) -> &Path;

    /// Metadata table contents.
    fn metadata(&self) -> &Metadata;

    /// Fetch the tile stored at (`x`, `y`, `z`), or `None` if there is no such row.
    fn get(&self, x: u32, y: u32, z: u8) -> Result<Option<Bytes>, ArchiveError>;

    /// Minimum and maximum zoom level present in the tile table.
    ///
    /// Returns `None` when the tile table is empty. This scans the tile index
    /// and should be called at most once per open archive.
    fn zoom_range(&self) -> Result<Option<(u8, u8)>, ArchiveError>;
}

/// Opens archives from filesystem paths.
///
/// This abstraction lets the locator work with the real SQLite adapter in
/// production and with in-memory archives in tests.
pub trait ArchiveOpener: Send + Sync + 'static {
    /// The archive type this opener produces.
    type Archive: TileArchive;

    /// Open and validate the archive at `path`.
    fn open(&self, path: &Path) -> Result<Self::Archive, ArchiveError>;
}

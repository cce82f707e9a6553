//! Tileset lookup across an ordered list of search roots.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::archive::{ArchiveOpener, MBTilesOpener, MBTILES_EXTENSION};
use crate::error::TilesetError;

use super::Tileset;

/// Finds and opens tilesets by name.
///
/// Roots are searched in order and the first existing file wins. The locator
/// is immutable after construction and shared by all requests.
#[derive(Debug, Clone)]
pub struct TilesetLocator<O: ArchiveOpener> {
    roots: Vec<PathBuf>,
    opener: O,
}

impl TilesetLocator<MBTilesOpener> {
    /// Create a locator for MBTiles files under `roots`.
    pub fn mbtiles(roots: Vec<PathBuf>) -> Self {
        Self::new(roots, MBTilesOpener)
    }
}

impl<O: ArchiveOpener> TilesetLocator<O> {
    /// Create a locator using a custom archive opener.
    pub fn new(roots: Vec<PathBuf>, opener: O) -> Self {
        Self { roots, opener }
    }

    /// The configured search roots, in search order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Path of the first existing archive file for `name`, if any.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_name(name) {
            return None;
        }

        let filename = format!("{}.{}", name, MBTILES_EXTENSION);
        self.roots
            .iter()
            .map(|root| root.join(&filename))
            .find(|path| path.exists())
    }

    /// Locate and open the tileset called `name`.
    ///
    /// A missing file and a file that fails to open are both reported as
    /// [`TilesetError::TilesetNotFound`].
    pub fn locate(&self, name: &str) -> Result<Tileset<O::Archive>, TilesetError> {
        let Some(path) = self.find(name) else {
            debug!(tileset = name, "Tileset not found in any search root");
            return Err(TilesetError::TilesetNotFound);
        };

        match self.opener.open(&path) {
            Ok(archive) => Ok(Tileset::new(name, archive)),
            Err(e) => {
                warn!(tileset = name, path = %path.display(), "Failed to open tileset: {}", e);
                Err(TilesetError::TilesetNotFound)
            }
        }
    }
}

/// Whether `name` can be joined onto a root without escaping it.
///
/// Rejects empty names, path separators, NUL bytes, and the `.`/`..` components.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).components().count() == 1
}

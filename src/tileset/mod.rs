//! Tileset resolution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! └────────────────────┬────────────────────┘
//!                      │ locate(name)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            TilesetLocator               │
//! │  (ordered roots, first match wins)      │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tileset<A>                 │
//! │  (open archive + memoized zoom bounds)  │
//! └────────────────────┬────────────────────┘
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │   Descriptor    │    │  tile(TileCoord)    │
//! │   (TileJSON)    │    │  (XYZ -> TMS row)   │
//! └─────────────────┘    └─────────────────────┘
//! ```

mod coord;
mod descriptor;
mod locator;

use std::cell::OnceCell;
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, SubsecRound, Utc};
use tracing::debug;

use crate::archive::TileArchive;
use crate::error::{ArchiveError, DescriptorError};

pub use coord::{TileCoord, MAX_ZOOM};
pub use descriptor::{
    resolve_hosts, Bounds, Descriptor, RequestContext, ZoomBounds, MAXZOOM_KEY, MINZOOM_KEY,
    TILEJSON_VERSION,
};
pub use locator::{is_safe_name, TilesetLocator};

/// An open tileset, owned by the request that located it.
///
/// Dropping the tileset releases the underlying archive.
#[derive(Debug)]
pub struct Tileset<A: TileArchive> {
    name: String,
    archive: A,
    zoom: OnceCell<ZoomBounds>,
}

impl<A: TileArchive> Tileset<A> {
    pub(crate) fn new(name: impl Into<String>, archive: A) -> Self {
        Self {
            name: name.into(),
            archive,
            zoom: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn path(&self) -> &Path {
        self.archive.path()
    }

    /// Declared image format (`png`, `jpg`, ...).
    pub fn format(&self) -> Option<&str> {
        self.archive.metadata().get("format").map(String::as_str)
    }

    /// Size of the archive file in bytes.
    pub fn filesize(&self) -> std::io::Result<u64> {
        Ok(std::fs::metadata(self.path())?.len())
    }

    /// Modification time of the archive file, truncated to whole seconds.
    ///
    /// HTTP dates have one-second resolution, so comparisons against
    /// conditional request headers must use the truncated value.
    pub fn modified(&self) -> std::io::Result<DateTime<Utc>> {
        let modified = std::fs::metadata(self.path())?.modified()?;
        Ok(DateTime::<Utc>::from(modified).trunc_subsecs(0))
    }

    /// Zoom bounds of this tileset.
    ///
    /// Uses the cached `x-minzoom`/`x-maxzoom` metadata when both are valid.
    /// Otherwise scans the tile table once; the result is kept for the
    /// lifetime of this handle and never written back to the archive.
    pub fn zoom_bounds(&self) -> Result<ZoomBounds, DescriptorError> {
        if let Some(zoom) = self.zoom.get() {
            return Ok(*zoom);
        }

        let zoom = match ZoomBounds::from_metadata(self.archive.metadata()) {
            Some(zoom) => zoom,
            None => {
                debug!(tileset = %self.name, "Inferring zoom bounds from tile table");
                let (min, max) = self.archive.zoom_range()?.ok_or(DescriptorError::NoTiles)?;
                ZoomBounds::new(min, max).ok_or(DescriptorError::NoTiles)?
            }
        };

        Ok(*self.zoom.get_or_init(|| zoom))
    }

    /// Resolve the TileJSON descriptor for this tileset.
    pub fn descriptor(&self, context: &RequestContext) -> Result<Descriptor, DescriptorError> {
        let zoom = self.zoom_bounds()?;
        let filesize = self.filesize()?;
        Ok(Descriptor::build(
            &self.name,
            self.archive.metadata(),
            filesize,
            zoom,
            context,
        ))
    }

    /// Fetch the tile at an XYZ coordinate.
    pub fn tile(&self, coord: TileCoord) -> Result<Option<Bytes>, ArchiveError> {
        self.archive.get(coord.x, coord.tms_row(), coord.z)
    }
}

//! Tile Service for resolving TileJSON and tile requests.
//!
//! The TileService is the protocol core behind the HTTP handlers. It
//! orchestrates:
//! - Tileset lookup via the locator
//! - Descriptor resolution for TileJSON
//! - Format checks, conditional caching, and XYZ to TMS conversion for tiles
//! - Normalization of every internal failure into a [`TilesetError`]
//!
//! All methods perform synchronous file and SQLite I/O and should be called
//! from a blocking context. Each call opens its own archive and drops it
//! before returning.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         TileService                             │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        tilejson()        │  │         get_tile()          │  │
//! │  │  1. Locate tileset       │  │  1. Locate tileset          │  │
//! │  │  2. Resolve descriptor   │  │  2. Check format            │  │
//! │  │                          │  │  3. Check preconditions     │  │
//! │  │                          │  │  4. Flip y, read tile       │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! │                       │                                         │
//! │                       ▼                                         │
//! │               ┌────────────────┐                                │
//! │               │ TilesetLocator │                                │
//! │               └────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::archive::ArchiveOpener;
use crate::error::TilesetError;
use crate::tileset::{Descriptor, RequestContext, TileCoord, TilesetLocator};

use super::conditional::Preconditions;

// =============================================================================
// Tile Format
// =============================================================================

/// Image formats served by the tile endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFormat {
    Png,
    Jpeg,
}

impl TileFormat {
    /// Value of the archive's `format` metadata entry for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Jpeg => "jpg",
        }
    }

    /// MIME type sent with tiles of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            TileFormat::Png => "image/png",
            TileFormat::Jpeg => "image/jpeg",
        }
    }

    /// Map a URL extension to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "png" => Some(TileFormat::Png),
            "jpg" => Some(TileFormat::Jpeg),
            _ => None,
        }
    }
}

// =============================================================================
// Tile Request
// =============================================================================

/// A request for a single tile.
///
/// Coordinates are kept unvalidated so that conditional requests can be
/// answered before the coordinate is checked.
#[derive(Debug, Clone)]
pub struct TileRequest {
    /// Tileset name
    pub tileset: String,

    /// Zoom level
    pub z: u32,

    /// Column (0-indexed from the west)
    pub x: u32,

    /// Row in XYZ orientation (0-indexed from the north)
    pub y: u32,

    /// Format the client asked for
    pub format: TileFormat,

    /// Conditional request headers
    pub preconditions: Preconditions,
}

impl TileRequest {
    /// Create an unconditional tile request.
    pub fn new(tileset: impl Into<String>, z: u32, x: u32, y: u32, format: TileFormat) -> Self {
        Self {
            tileset: tileset.into(),
            z,
            x,
            y,
            format,
            preconditions: Preconditions::default(),
        }
    }

    /// Attach conditional request headers.
    pub fn with_preconditions(mut self, preconditions: Preconditions) -> Self {
        self.preconditions = preconditions;
        self
    }
}

// =============================================================================
// Tile Response
// =============================================================================

/// Response from the tile service.
#[derive(Debug, Clone, PartialEq)]
pub enum TileResponse {
    /// The client's cached copy is still valid
    NotModified,

    /// Tile bytes exactly as stored in the archive
    Tile {
        data: Bytes,
        format: TileFormat,
        last_modified: DateTime<Utc>,
    },
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service for answering TileJSON and tile requests.
pub struct TileService<O: ArchiveOpener> {
    locator: TilesetLocator<O>,
}

impl<O: ArchiveOpener> TileService<O> {
    /// Create a new tile service backed by `locator`.
    pub fn new(locator: TilesetLocator<O>) -> Self {
        Self { locator }
    }

    /// Resolve the TileJSON descriptor for `name`.
    ///
    /// Every failure, including archive errors during resolution, is reported
    /// as [`TilesetError::TilesetNotFound`].
    pub fn tilejson(
        &self,
        name: &str,
        context: &RequestContext,
    ) -> Result<Descriptor, TilesetError> {
        let tileset = self.locator.locate(name)?;

        tileset.descriptor(context).map_err(|e| {
            warn!(tileset = name, "Failed to resolve descriptor: {}", e);
            TilesetError::TilesetNotFound
        })
    }

    /// Serve a tile.
    ///
    /// 1. Locate the tileset
    /// 2. Reject requests whose format differs from the tileset's
    /// 3. Answer `NotModified` if the preconditions allow it
    /// 4. Convert the row to TMS and read the tile
    pub fn get_tile(&self, request: &TileRequest) -> Result<TileResponse, TilesetError> {
        let tileset = self.locator.locate(&request.tileset)?;

        let expected = request.format.extension();
        if tileset.format() != Some(expected) {
            debug!(
                tileset = %request.tileset,
                expected,
                actual = ?tileset.format(),
                "Tile format mismatch"
            );
            return Err(TilesetError::TileNotFound);
        }

        let last_modified = tileset.modified().map_err(|e| {
            error!(tileset = %request.tileset, "Failed to read modification time: {}", e);
            TilesetError::TilesetNotFound
        })?;

        if request.preconditions.not_modified(last_modified) {
            return Ok(TileResponse::NotModified);
        }

        let coord =
            TileCoord::new(request.z, request.x, request.y).ok_or(TilesetError::TileNotFound)?;

        let data = tileset
            .tile(coord)
            .map_err(|e| {
                error!(tileset = %request.tileset, %coord, "Tile lookup failed: {}", e);
                TilesetError::TilesetNotFound
            })?
            .ok_or(TilesetError::TileNotFound)?;

        Ok(TileResponse::Tile {
            data,
            format: request.format,
            last_modified,
        })
    }
}

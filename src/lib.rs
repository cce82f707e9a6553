//! MBTiles Server - TileJSON and XYZ tiles from MBTiles archives.
//!
//! This crate serves map tilesets stored as MBTiles (SQLite) files over HTTP.
//! Each `<name>.mbtiles` file found in the configured directories is exposed
//! as a TileJSON 2.0.0 descriptor and as XYZ-addressed PNG or JPEG tiles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │      /v3/{tileset}.json        /v3/{tileset}/{z}/{x}/{y}.png    │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │                        Tile Service                             │
//! │   (format checks, conditional requests, error normalization)    │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │                  Tileset Locator / Tileset                      │
//! │        (search roots, descriptor resolution, XYZ -> TMS)        │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │                        MBTiles Archive                          │
//! │            (read-only SQLite: metadata + tiles tables)          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`archive`]: Read-only access to MBTiles files
//! - [`tileset`]: Tileset lookup, TileJSON descriptors, tile coordinates
//! - [`tile`]: Tile service and conditional request handling
//! - [`server`]: HTTP handlers, router, and CORS
//! - [`config`]: Command-line and environment configuration
//! - [`error`]: Error types

pub mod archive;
pub mod config;
pub mod error;
pub mod server;
pub mod tile;
pub mod tileset;

pub use config::Config;
pub use error::{ArchiveError, DescriptorError, TilesetError};

pub use archive::{ArchiveOpener, MBTiles, MBTilesOpener, Metadata, TileArchive};

pub use server::{create_router, AppState, RouterConfig};

pub use tile::{Preconditions, TileFormat, TileRequest, TileResponse, TileService};

pub use tileset::{
    Bounds, Descriptor, RequestContext, TileCoord, Tileset, TilesetLocator, ZoomBounds,
};

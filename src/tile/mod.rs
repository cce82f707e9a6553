//! Tile service layer.
//!
//! This module answers TileJSON and tile requests independently of HTTP:
//!
//! - [`TileService`]: locates tilesets and resolves descriptors and tiles
//! - [`TileRequest`] / [`TileResponse`]: parameters and outcome of a tile request
//! - [`TileFormat`]: the PNG and JPEG bindings of the tile endpoint
//! - [`Preconditions`]: `If-Modified-Since` / `If-Unmodified-Since` evaluation
//!
//! # Example
//!
//! ```no_run
//! use mbtiles_server::tile::{TileFormat, TileRequest, TileResponse, TileService};
//! use mbtiles_server::tileset::TilesetLocator;
//!
//! let locator = TilesetLocator::mbtiles(vec!["/srv/tiles".into()]);
//! let service = TileService::new(locator);
//!
//! let request = TileRequest::new("world", 2, 1, 1, TileFormat::Png);
//! if let Ok(TileResponse::Tile { data, .. }) = service.get_tile(&request) {
//!     println!("{} bytes", data.len());
//! }
//! ```

mod conditional;
mod service;

pub use conditional::{format_http_date, parse_http_date, Preconditions};
pub use service::{TileFormat, TileRequest, TileResponse, TileService};

//! HTTP server layer.
//!
//! This module exposes the tile service over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /v3/{tileset}.json     GET /v3/{tileset}/{z}/{x}/{y}.png  │
//! │                                                                 │
//! │  ┌─────────────────────────┐  ┌──────────────────────────────┐  │
//! │  │        handlers         │  │           routes             │  │
//! │  │ (requests, error bodies)│  │  (router, CORS, tracing)     │  │
//! │  └─────────────────────────┘  └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, is_valid_callback, not_found_handler, tile_handler, tilejson_handler,
    AppState, HealthResponse, TileJsonQueryParams, TilePathParams, JAVASCRIPT_CONTENT_TYPE,
    JSON_CONTENT_TYPE,
};
pub use routes::{create_router, RouterConfig, DEFAULT_TILE_MAX_AGE};

//! Router configuration for the tileset server.
//!
//! This module defines the HTTP routes and applies the CORS and tracing
//! middleware.
//!
//! # Route Structure
//!
//! ```text
//! /health                              - Health check
//! /v3/{tileset}.json                   - TileJSON / JSONP descriptor
//! /v3/{tileset}/{z}/{x}/{y}.png        - PNG tile
//! /v3/{tileset}/{z}/{x}/{y}.jpg        - JPEG tile
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mbtiles_server::server::{create_router, RouterConfig};
//! use mbtiles_server::tile::TileService;
//! use mbtiles_server::tileset::TilesetLocator;
//!
//! let locator = TilesetLocator::mbtiles(vec!["/srv/tiles".into()]);
//! let tile_service = TileService::new(locator);
//!
//! let config = RouterConfig::new()
//!     .with_servers(vec!["a.tiles.example.com".to_string()]);
//!
//! let router = create_router(tile_service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::Method;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, not_found_handler, tile_handler, tilejson_handler, AppState,
};
use crate::archive::ArchiveOpener;
use crate::tile::TileService;

/// Default Cache-Control max-age for tiles (one day).
pub const DEFAULT_TILE_MAX_AGE: u32 = 86400;

/// Max-age advertised on CORS preflight responses.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Static hosts to advertise in TileJSON tile URLs
    pub servers: Vec<String>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - Cache max-age is one day (86400 seconds)
    /// - Tile URLs use the request host
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cache_max_age: DEFAULT_TILE_MAX_AGE,
            servers: Vec::new(),
            enable_tracing: true,
        }
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Advertise these hosts instead of the request host.
    pub fn with_servers(mut self, servers: Vec<String>) -> Self {
        self.servers = servers;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - TileJSON and tile routes (GET, HEAD)
/// - Health check
/// - Plain-text `Not Found` for every unmatched path
/// - CORS headers on every response; the CORS layer answers every `OPTIONS`
/// - Request tracing (optional)
pub fn create_router<O: ArchiveOpener>(
    tile_service: TileService<O>,
    config: RouterConfig,
) -> Router {
    let app_state = AppState::new(tile_service, config.cache_max_age, config.servers);

    // Both routes capture the first segment as {tileset}; the TileJSON
    // handler strips the ".json" suffix itself.
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/v3/{tileset}", get(tilejson_handler::<O>))
        .route("/v3/{tileset}/{z}/{x}/{filename}", get(tile_handler::<O>))
        .fallback(not_found_handler)
        .with_state(app_state)
        .layer(build_cors_layer());

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer.
///
/// Any origin is allowed. The layer answers every `OPTIONS` request itself,
/// matched route or not, echoing `Access-Control-Request-Headers` back.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(PREFLIGHT_MAX_AGE)
}

// =============================================================================
// Tests
// =============================================================================

//! HTTP request handlers for the tileset API.
//!
//! This module contains the Axum handlers for TileJSON, tiles, health
//! checks, and unmatched routes. `OPTIONS` requests never reach them; the
//! CORS layer answers those.
//!
//! # Endpoints
//!
//! - `GET /v3/{tileset}.json` - TileJSON (or JSONP) descriptor
//! - `GET /v3/{tileset}/{z}/{x}/{y}.png` - PNG tile
//! - `GET /v3/{tileset}/{z}/{x}/{y}.jpg` - JPEG tile
//! - `GET /health` - Health check endpoint

use std::sync::{Arc, LazyLock};

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::archive::ArchiveOpener;
use crate::error::TilesetError;
use crate::tile::{
    format_http_date, Preconditions, TileFormat, TileRequest, TileResponse, TileService,
};
use crate::tileset::{resolve_hosts, RequestContext};

/// Content type of plain TileJSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type of JSONP-wrapped TileJSON responses.
pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

static CALLBACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("callback pattern is valid"));

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile service.
///
/// This is passed to all handlers via Axum's State extractor. Everything in
/// it is read-only after startup.
pub struct AppState<O: ArchiveOpener> {
    /// The tile service for processing requests
    pub tile_service: Arc<TileService<O>>,

    /// Cache-Control max-age in seconds for tile responses
    pub cache_max_age: u32,

    /// Static tile hosts; empty means "use the request host"
    pub servers: Arc<[String]>,
}

impl<O: ArchiveOpener> AppState<O> {
    /// Create a new application state with the given tile service.
    pub fn new(tile_service: TileService<O>, cache_max_age: u32, servers: Vec<String>) -> Self {
        Self {
            tile_service: Arc::new(tile_service),
            cache_max_age,
            servers: servers.into(),
        }
    }
}

impl<O: ArchiveOpener> Clone for AppState<O> {
    fn clone(&self) -> Self {
        Self {
            tile_service: Arc::clone(&self.tile_service),
            cache_max_age: self.cache_max_age,
            servers: Arc::clone(&self.servers),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Extracted from: `/v3/{tileset}/{z}/{x}/{filename}`
/// where filename is `{y}.png` or `{y}.jpg`
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    /// Tileset name
    pub tileset: String,

    /// Zoom level, unparsed
    pub z: String,

    /// Tile X coordinate, unparsed
    pub x: String,

    /// Tile Y coordinate with image extension (e.g., "3.png")
    pub filename: String,
}

impl TilePathParams {
    /// Parse the coordinate and the requested format.
    ///
    /// Returns `None` for non-numeric coordinates or unknown extensions.
    pub fn parse(&self) -> Option<(u32, u32, u32, TileFormat)> {
        let (y, extension) = self.filename.rsplit_once('.')?;
        let format = TileFormat::from_extension(extension)?;
        Some((
            self.z.parse().ok()?,
            self.x.parse().ok()?,
            y.parse().ok()?,
            format,
        ))
    }
}

/// Query parameters for TileJSON requests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TileJsonQueryParams {
    /// JSONP callback name
    pub callback: Option<String>,
}

impl TileJsonQueryParams {
    /// Pick the parameters out of decoded query pairs.
    ///
    /// When a parameter is repeated, the first occurrence wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let callback = pairs
            .into_iter()
            .find(|(key, _)| key == "callback")
            .map(|(_, value)| value);
        Self { callback }
    }
}

/// Whether `callback` is a safe JSONP identifier.
pub fn is_valid_callback(callback: &str) -> bool {
    CALLBACK_PATTERN.is_match(callback)
}

/// URL scheme of the inbound request.
///
/// Prefers `X-Forwarded-Proto` (for reverse proxy support), then the request
/// URI, and falls back to `http`.
pub fn request_scheme(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|proto| !proto.is_empty())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http")
        .to_string()
}

/// Host of the inbound request, from the `Host` header or the request URI.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost")
        .to_string()
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TilesetError to a plain-text HTTP response.
///
/// Not-found kinds all render as 404 with the error description as body, so
/// JSON endpoints never produce JSON error bodies.
impl IntoResponse for TilesetError {
    fn into_response(self) -> Response {
        let status = match self {
            TilesetError::BadRequest => StatusCode::BAD_REQUEST,
            TilesetError::NotFound
            | TilesetError::TileNotFound
            | TilesetError::TilesetNotFound => StatusCode::NOT_FOUND,
        };

        if status == StatusCode::NOT_FOUND {
            debug!(status = status.as_u16(), "Resource not found: {}", self);
        } else {
            warn!(status = status.as_u16(), "Client error: {}", self);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain")],
            self.description(),
        )
            .into_response()
    }
}

/// Run synchronous archive work on the blocking thread pool.
///
/// The archive is opened and dropped inside `f`, so it is released on every
/// exit path.
async fn run_blocking<T, F>(f: F) -> Result<T, TilesetError>
where
    F: FnOnce() -> Result<T, TilesetError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap_or_else(|e| {
        error!("Blocking task failed: {}", e);
        Err(TilesetError::TilesetNotFound)
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle TileJSON requests.
///
/// # Endpoint
///
/// `GET /v3/{tileset}.json`
///
/// # Query Parameters
///
/// - `callback`: JSONP callback; must match `[A-Za-z_][A-Za-z0-9_]*`
///
/// # Response
///
/// - `200 OK`: TileJSON with sorted keys, or `callback(...)` as JavaScript
/// - `400 Bad Request`: Invalid callback (checked before any archive access)
/// - `404 Not Found`: Tileset missing or unreadable
pub async fn tilejson_handler<O: ArchiveOpener>(
    State(state): State<AppState<O>>,
    Path(filename): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, TilesetError> {
    let name = filename
        .strip_suffix(".json")
        .ok_or(TilesetError::NotFound)?
        .to_string();

    let Query(pairs) = query.map_err(|e| {
        warn!("Rejected TileJSON query string: {}", e);
        TilesetError::BadRequest
    })?;
    let query = TileJsonQueryParams::from_pairs(pairs);

    if let Some(ref callback) = query.callback {
        if !is_valid_callback(callback) {
            return Err(TilesetError::BadRequest);
        }
    }

    let hosts = resolve_hosts(&state.servers, &request_host(&headers, &uri));
    let context = RequestContext::new(request_scheme(&headers, &uri), hosts);

    let service = Arc::clone(&state.tile_service);
    let descriptor = run_blocking(move || service.tilejson(&name, &context)).await?;

    let json = descriptor.to_json().map_err(|e| {
        error!("Failed to serialize TileJSON: {}", e);
        TilesetError::TilesetNotFound
    })?;

    let (body, content_type) = match query.callback {
        Some(callback) => (format!("{}({})", callback, json), JAVASCRIPT_CONTENT_TYPE),
        None => (json, JSON_CONTENT_TYPE),
    };

    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /v3/{tileset}/{z}/{x}/{y}.png` or `.jpg`
///
/// # Response
///
/// - `200 OK`: Stored tile bytes with `Content-Type`, `Cache-Control`, and
///   `Last-Modified` headers
/// - `304 Not Modified`: Conditional request matched; empty body
/// - `404 Not Found`: Tileset missing, format mismatch, or tile absent
pub async fn tile_handler<O: ArchiveOpener>(
    State(state): State<AppState<O>>,
    Path(params): Path<TilePathParams>,
    headers: HeaderMap,
) -> Result<Response, TilesetError> {
    let (z, x, y, format) = params.parse().ok_or(TilesetError::NotFound)?;

    let request = TileRequest::new(params.tileset, z, x, y, format)
        .with_preconditions(Preconditions::from_headers(&headers));

    let service = Arc::clone(&state.tile_service);
    let response = run_blocking(move || service.get_tile(&request)).await?;

    match response {
        TileResponse::NotModified => Ok(StatusCode::NOT_MODIFIED.into_response()),
        TileResponse::Tile {
            data,
            format,
            last_modified,
        } => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CACHE_CONTROL,
                    format!("max-age={}", state.cache_max_age),
                ),
                (header::LAST_MODIFIED, format_http_date(last_modified)),
            ],
            data,
        )
            .into_response()),
    }
}

/// Handle requests that match no route.
pub async fn not_found_handler() -> TilesetError {
    TilesetError::NotFound
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================

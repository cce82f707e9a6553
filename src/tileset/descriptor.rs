//! TileJSON descriptor resolution.
//!
//! Turns raw archive metadata into the TileJSON document served for a tileset:
//!
//! - zoom bounds come from the cached `x-minzoom`/`x-maxzoom` entries, or from
//!   one aggregate scan of the tile table when either is missing
//! - `bounds` is parsed from `west,south,east,north` and the center is derived
//!   from it
//! - tile URL templates are built per request from the resolved host list

use serde::Serialize;
use tracing::warn;

use crate::archive::Metadata;

/// TileJSON version advertised in descriptors.
pub const TILEJSON_VERSION: &str = "2.0.0";

/// Metadata key holding the cached minimum zoom level.
pub const MINZOOM_KEY: &str = "x-minzoom";

/// Metadata key holding the cached maximum zoom level.
pub const MAXZOOM_KEY: &str = "x-maxzoom";

// =============================================================================
// Zoom Bounds
// =============================================================================

/// Inclusive zoom range of a tileset. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomBounds {
    min: u8,
    max: u8,
}

impl ZoomBounds {
    /// Create bounds, returning `None` if `min > max`.
    pub fn new(min: u8, max: u8) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// Read the cached zoom entries from metadata.
    ///
    /// Returns `None` if either entry is missing, unparsable, or inconsistent.
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        let parse = |key: &str| metadata.get(key)?.trim().parse::<u8>().ok();
        Self::new(parse(MINZOOM_KEY)?, parse(MAXZOOM_KEY)?)
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Zoom level halfway between min and max.
    pub fn midpoint(&self) -> f64 {
        (f64::from(self.max) + f64::from(self.min)) / 2.0
    }
}

// =============================================================================
// Bounding Box
// =============================================================================

/// Geographic extent of a tileset in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    /// Parse a `west,south,east,north` string.
    ///
    /// Returns `None` unless there are exactly four finite numbers.
    pub fn parse(value: &str) -> Option<Self> {
        let values = value
            .split(',')
            .map(|v| v.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<f64>>>()?;

        match values.as_slice() {
            &[west, south, east, north] => Some(Self {
                west,
                south,
                east,
                north,
            }),
            _ => None,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Center of the box, with the zoom midpoint as third element.
    pub fn center(&self, zoom: ZoomBounds) -> [f64; 3] {
        [
            (self.east + self.west) / 2.0,
            (self.north + self.south) / 2.0,
            zoom.midpoint(),
        ]
    }
}

// =============================================================================
// Request Context
// =============================================================================

/// Per-request inputs for building tile URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// URL scheme of the inbound request (`http` or `https`)
    pub scheme: String,

    /// Hosts that serve tile images
    pub hosts: Vec<String>,
}

impl RequestContext {
    pub fn new(scheme: impl Into<String>, hosts: Vec<String>) -> Self {
        Self {
            scheme: scheme.into(),
            hosts,
        }
    }

    /// One tile URL template per host for the given tileset and extension.
    pub fn tile_urls(&self, name: &str, extension: &str) -> Vec<String> {
        self.hosts
            .iter()
            .map(|host| {
                format!(
                    "{}://{}/v3/{}/{{z}}/{{x}}/{{y}}.{}",
                    self.scheme, host, name, extension
                )
            })
            .collect()
    }
}

/// Hosts that serve tile images for this request.
///
/// A configured static list is used verbatim, which allows tile URLs to point
/// at CDN hostnames. Otherwise the request's own host is used.
pub fn resolve_hosts(configured: &[String], request_host: &str) -> Vec<String> {
    if configured.is_empty() {
        vec![request_host.to_string()]
    } else {
        configured.to_vec()
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// A resolved TileJSON document.
///
/// Fields are declared in lexicographic key order; [`Descriptor::to_json`]
/// goes through `serde_json::Value`, whose map sorts keys, so the output is
/// deterministic either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 3]>,
    pub description: Option<String>,
    pub filesize: u64,
    pub id: String,
    pub legend: Option<String>,
    pub maxzoom: u8,
    pub minzoom: u8,
    pub name: Option<String>,
    pub private: bool,
    pub scheme: String,
    pub tilejson: String,
    pub tiles: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub version: Option<String>,
    pub webpage: Option<String>,
}

impl Descriptor {
    /// Build a descriptor from raw metadata and already-resolved zoom bounds.
    ///
    /// A malformed `bounds` entry is logged and omitted along with `center`.
    pub fn build(
        id: &str,
        metadata: &Metadata,
        filesize: u64,
        zoom: ZoomBounds,
        context: &RequestContext,
    ) -> Self {
        let text = |key: &str| metadata.get(key).cloned();
        let format = metadata.get("format").map(String::as_str).unwrap_or_default();

        let bounds = match metadata.get("bounds").map(String::as_str) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = Bounds::parse(raw);
                if parsed.is_none() {
                    warn!(tileset = id, bounds = raw, "Ignoring malformed bounds metadata");
                }
                parsed
            }
        };

        Self {
            bounds: bounds.map(|b| b.to_array()),
            center: bounds.map(|b| b.center(zoom)),
            description: text("description"),
            filesize,
            id: id.to_string(),
            legend: None,
            maxzoom: zoom.max(),
            minzoom: zoom.min(),
            name: text("name"),
            private: true,
            scheme: "xyz".to_string(),
            tilejson: TILEJSON_VERSION.to_string(),
            tiles: context.tile_urls(id, format),
            kind: text("type"),
            version: text("version"),
            webpage: None,
        }
    }

    /// Serialize to compact JSON with lexicographically sorted keys.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&value)
    }
}

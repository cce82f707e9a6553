//! Configuration management for the tileset server.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `MBTILES_` prefix
//! - Sensible defaults for all settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use mbtiles_server::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `MBTILES_HOST` - Server bind address (default: 0.0.0.0)
//! - `MBTILES_PORT` - Server port (default: 3000)
//! - `MBTILES_PATHS` - Comma-separated tileset directories (default: current directory)
//! - `MBTILES_SERVERS` - Comma-separated tile hosts for TileJSON (default: request host)
//! - `MBTILES_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 86400)

use std::path::PathBuf;

use clap::Parser;

use crate::server::DEFAULT_TILE_MAX_AGE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default HTTP cache max-age in seconds (1 day).
pub const DEFAULT_CACHE_MAX_AGE: u32 = DEFAULT_TILE_MAX_AGE;

// =============================================================================
// CLI Arguments
// =============================================================================

/// MBTiles Server - TileJSON and XYZ tiles from MBTiles archives.
///
/// Serves `.mbtiles` files found in one or more directories. Each file is
/// exposed under its stem, e.g. `world.mbtiles` becomes `/v3/world.json`.
#[derive(Parser, Debug, Clone)]
#[command(name = "mbtiles-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MBTILES_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MBTILES_PORT")]
    pub port: u16,

    // =========================================================================
    // Tileset Configuration
    // =========================================================================
    /// Directories searched for `<name>.mbtiles`, in priority order
    /// (comma-separated).
    ///
    /// If not specified, the current directory is searched.
    #[arg(long, env = "MBTILES_PATHS", value_delimiter = ',')]
    pub paths: Vec<PathBuf>,

    /// Hosts advertised in TileJSON tile URLs (comma-separated).
    ///
    /// Entries are bare `host[:port]` values. If not specified, the host of
    /// each request is used.
    #[arg(long, env = "MBTILES_SERVERS", value_delimiter = ',')]
    pub servers: Vec<String>,

    /// HTTP Cache-Control max-age in seconds for tiles.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "MBTILES_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.paths.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(
                "Tileset paths must not be empty. Check --paths or MBTILES_PATHS".to_string(),
            );
        }

        for server in &self.servers {
            if server.trim().is_empty() {
                return Err("Server entries must not be empty".to_string());
            }
            if server.contains("://") || server.contains('/') {
                return Err(format!(
                    "Invalid server '{}': expected host[:port] without scheme or path",
                    server
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directories to search for tilesets, falling back to the current
    /// directory.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }

    /// Server entries with surrounding whitespace removed.
    pub fn tile_servers(&self) -> Vec<String> {
        self.servers.iter().map(|s| s.trim().to_string()).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

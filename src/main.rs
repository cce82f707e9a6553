//! MBTiles Server - TileJSON and XYZ tiles from MBTiles archives.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mbtiles_server::{
    config::Config,
    server::{create_router, RouterConfig},
    tile::TileService,
    tileset::TilesetLocator,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let roots = config.search_roots();
    let servers = config.tile_servers();

    info!("MBTiles Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    for root in &roots {
        if root.is_dir() {
            info!("  Tileset path: {}", root.display());
        } else {
            warn!("  Tileset path: {} (not a directory)", root.display());
        }
    }
    if servers.is_empty() {
        info!("  Tile hosts: request host");
    } else {
        info!("  Tile hosts: {}", servers.join(", "));
    }
    info!("  Cache max-age: {}s", config.cache_max_age);

    let locator = TilesetLocator::mbtiles(roots);
    let tile_service = TileService::new(locator);

    let router_config = build_router_config(&config, servers);
    let router = create_router(tile_service, router_config);

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/v3/<tileset>.json", addr);
    info!("    curl http://{}/v3/<tileset>/0/0/0.png", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "mbtiles_server=debug,tower_http=debug"
    } else {
        "mbtiles_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config, servers: Vec<String>) -> RouterConfig {
    RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_servers(servers)
        .with_tracing(!config.no_tracing)
}

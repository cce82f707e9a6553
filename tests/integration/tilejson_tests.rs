//! TileJSON integration tests.
//!
//! Tests verify:
//! - Descriptor contents and deterministic key order
//! - JSONP wrapping and callback validation
//! - Tile URL hosts and scheme
//! - Zoom inference from the tile table
//! - Tileset lookup across search roots

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;

use mbtiles_server::RouterConfig;

use super::test_utils::{
    body_text, counting_router, get, png_tile, router_for, router_with_config, send,
    write_corrupt_tileset, MBTilesBuilder,
};

fn world(dir: &TempDir) {
    MBTilesBuilder::new("png")
        .metadata("name", "World")
        .metadata("description", "A test world")
        .metadata("type", "baselayer")
        .metadata("version", "1.0.0")
        .metadata("bounds", "-180,-85,180,85")
        .metadata("x-minzoom", "0")
        .metadata("x-maxzoom", "4")
        .tile(0, 0, 0, png_tile(0))
        .write(dir.path(), "world");
}

// =============================================================================
// Descriptor Contents
// =============================================================================

#[tokio::test]
async fn test_tilejson_success() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let request = Request::builder()
        .uri("/v3/world.json")
        .header("host", "tiles.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["id"], "world");
    assert_eq!(json["name"], "World");
    assert_eq!(json["description"], "A test world");
    assert_eq!(json["type"], "baselayer");
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(json["tilejson"], "2.0.0");
    assert_eq!(json["scheme"], "xyz");
    assert_eq!(json["private"], true);
    assert_eq!(json["minzoom"], 0);
    assert_eq!(json["maxzoom"], 4);
    assert_eq!(json["bounds"], serde_json::json!([-180.0, -85.0, 180.0, 85.0]));
    assert_eq!(json["center"], serde_json::json!([0.0, 0.0, 2.0]));
    assert!(json["legend"].is_null());
    assert!(json["webpage"].is_null());
    assert!(json["filesize"].as_u64().unwrap() > 0);
    assert_eq!(
        json["tiles"],
        serde_json::json!(["http://tiles.example.com/v3/world/{z}/{x}/{y}.png"])
    );
}

#[tokio::test]
async fn test_tilejson_keys_sorted_and_stable() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let first = body_text(send(&router, get("/v3/world.json")).await).await;
    let second = body_text(send(&router, get("/v3/world.json")).await).await;
    assert_eq!(first, second);

    let keys = [
        "\"bounds\"",
        "\"center\"",
        "\"description\"",
        "\"filesize\"",
        "\"id\"",
        "\"legend\"",
        "\"maxzoom\"",
        "\"minzoom\"",
        "\"name\"",
        "\"private\"",
        "\"scheme\"",
        "\"tilejson\"",
        "\"tiles\"",
        "\"type\"",
        "\"version\"",
        "\"webpage\"",
    ];
    let positions: Vec<usize> = keys.iter().map(|k| first.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", first);
}

#[tokio::test]
async fn test_tilejson_missing_optional_metadata() {
    let dir = TempDir::new().unwrap();
    MBTilesBuilder::new("jpg")
        .tile(2, 1, 1, png_tile(1))
        .write(dir.path(), "bare");
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/bare.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(json["name"].is_null());
    assert!(json["description"].is_null());
    assert!(json.get("bounds").is_none());
    assert!(json.get("center").is_none());
    assert!(json["tiles"][0].as_str().unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn test_tilejson_malformed_bounds_omitted() {
    let dir = TempDir::new().unwrap();
    MBTilesBuilder::new("png")
        .metadata("bounds", "-180,-85,180")
        .tile(0, 0, 0, png_tile(0))
        .write(dir.path(), "skewed");
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/skewed.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(json.get("bounds").is_none());
    assert!(json.get("center").is_none());
}

// =============================================================================
// Zoom Inference
// =============================================================================

#[tokio::test]
async fn test_zoom_inferred_from_tiles() {
    let dir = TempDir::new().unwrap();
    MBTilesBuilder::new("png")
        .tile(3, 0, 0, png_tile(3))
        .tile(5, 1, 1, png_tile(5))
        .tile(9, 2, 2, png_tile(9))
        .write(dir.path(), "inferred");
    let (router, counters) = counting_router(&dir);

    let response = send(&router, get("/v3/inferred.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["minzoom"], 3);
    assert_eq!(json["maxzoom"], 9);
    assert_eq!(counters.zoom_queries(), 1);
}

#[tokio::test]
async fn test_cached_zoom_skips_scan() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let (router, counters) = counting_router(&dir);

    let response = send(&router, get("/v3/world.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(counters.zoom_queries(), 0);
}

#[tokio::test]
async fn test_empty_tileset_not_found() {
    let dir = TempDir::new().unwrap();
    MBTilesBuilder::new("png").write(dir.path(), "empty");
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/empty.json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Tileset does not exist");
}

// =============================================================================
// JSONP
// =============================================================================

#[tokio::test]
async fn test_jsonp_valid_callback() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let plain = body_text(send(&router, get("/v3/world.json")).await).await;
    let response = send(&router, get("/v3/world.json?callback=valid_Name1")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/javascript; charset=utf-8"
    );
    assert_eq!(body_text(response).await, format!("valid_Name1({})", plain));
}

#[tokio::test]
async fn test_jsonp_invalid_callback() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    for uri in [
        "/v3/world.json?callback=42bad",
        "/v3/world.json?callback=alert(1)",
        "/v3/world.json?callback=",
    ] {
        let response = send(&router, get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body_text(response).await, "Bad Request");
    }
}

#[tokio::test]
async fn test_jsonp_repeated_callback_uses_first() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let plain = body_text(send(&router, get("/v3/world.json")).await).await;
    let response = send(&router, get("/v3/world.json?callback=a&callback=b")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/javascript; charset=utf-8"
    );
    assert_eq!(body_text(response).await, format!("a({})", plain));
}

#[tokio::test]
async fn test_repeated_callback_validates_first() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/world.json?callback=42bad&callback=ok")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain"
    );
    assert_eq!(body_text(response).await, "Bad Request");
}

#[tokio::test]
async fn test_jsonp_invalid_callback_checked_before_lookup() {
    let dir = TempDir::new().unwrap();
    let (router, counters) = counting_router(&dir);

    let response = send(&router, get("/v3/missing.json?callback=42bad")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(counters.opens(), 0);
}

// =============================================================================
// Tile URLs
// =============================================================================

#[tokio::test]
async fn test_configured_servers() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let config = RouterConfig::new()
        .with_tracing(false)
        .with_servers(vec!["a.example.com".to_string(), "b.example.com".to_string()]);
    let router = router_with_config(&[&dir], config);

    let request = Request::builder()
        .uri("/v3/world.json")
        .header("host", "ignored.example.com")
        .body(Body::empty())
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(send(&router, request).await).await).unwrap();

    assert_eq!(
        json["tiles"],
        serde_json::json!([
            "http://a.example.com/v3/world/{z}/{x}/{y}.png",
            "http://b.example.com/v3/world/{z}/{x}/{y}.png",
        ])
    );
}

#[tokio::test]
async fn test_forwarded_proto_scheme() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let request = Request::builder()
        .uri("/v3/world.json")
        .header("host", "maps.example.com:8443")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();
    let json: Value = serde_json::from_str(&body_text(send(&router, request).await).await).unwrap();

    assert_eq!(
        json["tiles"][0],
        "https://maps.example.com:8443/v3/world/{z}/{x}/{y}.png"
    );
}

// =============================================================================
// Lookup
// =============================================================================

#[tokio::test]
async fn test_missing_tileset() {
    let dir = TempDir::new().unwrap();
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/nowhere.json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain"
    );
    assert_eq!(body_text(response).await, "Tileset does not exist");
}

#[tokio::test]
async fn test_corrupt_tileset() {
    let dir = TempDir::new().unwrap();
    write_corrupt_tileset(dir.path(), "broken");
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/broken.json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Tileset does not exist");
}

#[tokio::test]
async fn test_tileset_without_format_is_invalid() {
    let dir = TempDir::new().unwrap();
    MBTilesBuilder::empty()
        .metadata("name", "No format")
        .tile(0, 0, 0, png_tile(0))
        .write(dir.path(), "formatless");
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/formatless.json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Tileset does not exist");
}

#[tokio::test]
async fn test_first_root_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    MBTilesBuilder::new("png")
        .metadata("name", "First")
        .tile(0, 0, 0, png_tile(0))
        .write(first.path(), "shared");
    MBTilesBuilder::new("png")
        .metadata("name", "Second")
        .tile(0, 0, 0, png_tile(0))
        .write(second.path(), "shared");
    MBTilesBuilder::new("png")
        .metadata("name", "Only second")
        .tile(0, 0, 0, png_tile(0))
        .write(second.path(), "fallback");
    let router = router_for(&[&first, &second]);

    let json: Value =
        serde_json::from_str(&body_text(send(&router, get("/v3/shared.json")).await).await)
            .unwrap();
    assert_eq!(json["name"], "First");

    let json: Value =
        serde_json::from_str(&body_text(send(&router, get("/v3/fallback.json")).await).await)
            .unwrap();
    assert_eq!(json["name"], "Only second");
}

#[tokio::test]
async fn test_path_without_json_suffix() {
    let dir = TempDir::new().unwrap();
    world(&dir);
    let router = router_for(&[&dir]);

    let response = send(&router, get("/v3/world")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Not Found");
}

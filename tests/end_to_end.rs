//! End-to-end tests: real OctoPrint and Spoolman clients against mock servers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::{json, Value};
use spool_scanner::config::Config;
use spool_scanner::web::api::create_router;
use tower::util::ServiceExt;

const PLUGIN_PATH: &str = "/api/plugin/spoolman_api";

fn config_for(printer_a: &MockServer, printer_b: &MockServer, spoolman: &MockServer) -> Config {
    let (a, b, s) = (printer_a.base_url(), printer_b.base_url(), spoolman.base_url());
    Config::from_lookup(move |key| match key {
        "SPOOLMAN_URL" => Some(s.clone()),
        "PRINTER_1_NAME" => Some("Printer A".to_string()),
        "PRINTER_1_URL" => Some(a.clone()),
        "PRINTER_1_KEY" => Some("key-a".to_string()),
        "PRINTER_2_NAME" => Some("Printer B".to_string()),
        "PRINTER_2_URL" => Some(b.clone()),
        "PRINTER_2_KEY" => Some("key-b".to_string()),
        _ => None,
    })
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_printer_listing_end_to_end() {
    let printer_a = MockServer::start_async().await;
    let printer_b = MockServer::start_async().await;
    let spoolman = MockServer::start_async().await;

    printer_a
        .mock_async(|when, then| {
            when.method(GET).path("/api/printer").header("x-api-key", "key-a");
            then.status(200).json_body(json!({
                "state": {"text": "Operational", "flags": {"operational": true, "ready": true}}
            }));
        })
        .await;
    printer_a
        .mock_async(|when, then| {
            when.method(POST)
                .path(PLUGIN_PATH)
                .header("x-api-key", "key-a")
                .json_body(json!({"command": "get_current_spool", "tool": 0}));
            then.status(200).json_body(json!({"success": true, "spool_id": "7"}));
        })
        .await;

    // Printer B is down: every call fails.
    printer_b
        .mock_async(|when, then| {
            when.method(GET).path("/api/printer");
            then.status(502).body("Bad Gateway");
        })
        .await;
    printer_b
        .mock_async(|when, then| {
            when.method(POST).path(PLUGIN_PATH);
            then.status(502).body("Bad Gateway");
        })
        .await;

    spoolman
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/spool/7");
            then.status(200).json_body(json!({
                "id": 7,
                "initial_weight": 1000.0,
                "used_weight": 100.0,
                "filament": {"material": "PLA", "color_hex": "ABCDEF", "vendor": {"name": "Acme"}}
            }));
        })
        .await;

    let app = create_router(config_for(&printer_a, &printer_b, &spoolman), "web/static").unwrap();
    let request = Request::builder().uri("/api/printers").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let a = &json["printers"][0];
    assert_eq!(a["id"], "printer-1");
    assert_eq!(a["status"], "Ready");
    assert_eq!(a["url"], printer_a.base_url());
    assert_eq!(a["current_spool"]["id"], "7");
    assert_eq!(a["current_spool"]["color"], "#ABCDEF");
    assert_eq!(a["current_spool"]["material"], "PLA");
    assert!(a["current_spool"]["name"].as_str().unwrap().contains("PLA"));

    let b = &json["printers"][1];
    assert_eq!(b["id"], "printer-2");
    assert_eq!(b["status"], "Unknown");
    assert!(b.get("current_spool").is_none());
}

#[tokio::test]
async fn test_assign_end_to_end() {
    let printer_a = MockServer::start_async().await;
    let printer_b = MockServer::start_async().await;
    let spoolman = MockServer::start_async().await;

    let set_spool = printer_b
        .mock_async(|when, then| {
            when.method(POST)
                .path(PLUGIN_PATH)
                .header("x-api-key", "key-b")
                .json_body(json!({"command": "set_spool", "tool": 0, "spool_id": "12"}));
            then.status(200).json_body(json!({"success": true}));
        })
        .await;
    let untouched = printer_a
        .mock_async(|when, then| {
            when.method(POST).path(PLUGIN_PATH);
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let app = create_router(config_for(&printer_a, &printer_b, &spoolman), "web/static").unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/api/assign")
        .header("content-type", "application/json")
        .body(Body::from(json!({"spool_id": "12", "printer_id": "printer-2"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    set_spool.assert_async().await;
    untouched.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_spool_not_found_end_to_end() {
    let printer_a = MockServer::start_async().await;
    let printer_b = MockServer::start_async().await;
    let spoolman = MockServer::start_async().await;

    spoolman
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/spool/404");
            then.status(404).json_body(json!({"message": "No spool with ID 404 found."}));
        })
        .await;

    let app = create_router(config_for(&printer_a, &printer_b, &spoolman), "web/static").unwrap();
    let request = Request::builder().uri("/api/spool/404").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "Spool not found"}));
}

#[tokio::test]
async fn test_malformed_loaded_spool_never_reaches_spoolman() {
    let printer_a = MockServer::start_async().await;
    let printer_b = MockServer::start_async().await;
    let spoolman = MockServer::start_async().await;

    printer_a
        .mock_async(|when, then| {
            when.method(GET).path("/api/printer");
            then.status(200).json_body(json!({"state": {"text": "Operational", "flags": {"ready": true}}}));
        })
        .await;
    printer_a
        .mock_async(|when, then| {
            when.method(POST).path(PLUGIN_PATH);
            then.status(200).json_body(json!({"success": true, "spool_id": "../../admin?x=1"}));
        })
        .await;
    let admin = spoolman
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin");
            then.status(200).json_body(json!({"id": 1, "filament": {"material": "PLA"}}));
        })
        .await;

    let app = create_router(config_for(&printer_a, &printer_b, &spoolman), "web/static").unwrap();
    let request = Request::builder().uri("/api/printers").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["printers"][0]["status"], "Ready");
    assert!(json["printers"][0].get("current_spool").is_none());
    admin.assert_calls_async(0).await;
}

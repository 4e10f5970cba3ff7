//! Integration tests for the HTTP API.
//!
//! These tests drive the full router against a file-backed store in a
//! temporary directory.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use currency_hex::{CurrencyService, WriteMode, inbound::HttpServer, workers::spawn_ingestor};
use currency_repo::FileStore;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Helper to create a router over an empty store with direct writes.
fn create_test_app() -> (TempDir, Arc<FileStore>, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let (ingestor, _) = spawn_ingestor(Arc::clone(&store), 10, CancellationToken::new());
    let service =
        CurrencyService::new(Arc::clone(&store), ingestor).with_write_mode(WriteMode::Direct);
    let router = HttpServer::new(service).router();
    (dir, store, router)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Sends a request and returns the status with the decoded body (Null if empty).
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, code: &str, rate: f64, name: &str, symbol: &str) {
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/currency",
            json!({"code": code, "rate": rate, "name": name, "symbol": symbol}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health() {
    let (_dir, _store, app) = create_test_app();

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_currency_lifecycle() {
    let (_dir, store, app) = create_test_app();

    create(&app, "usd", 1.0, "US Dollar", "$").await;

    let (status, body) = send(&app, empty_request(Method::GET, "/currency/USD")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "USD");
    assert_eq!(body["symbol"], "$");

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/currency/usd",
            json!({"code": "EUR", "rate": 1.25, "name": "Dollar", "symbol": "US$"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "USD");
    assert_eq!(store.get("USD").unwrap().rate, 1.25);
    assert!(store.get("EUR").is_err());

    let (status, body) = send(&app, empty_request(Method::DELETE, "/currency/USD")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, empty_request(Method::GET, "/currency/USD")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_list_currencies_is_keyed_by_code() {
    let (_dir, _store, app) = create_test_app();
    create(&app, "USD", 1.0, "US Dollar", "$").await;
    create(&app, "EUR", 0.9, "Euro", "€").await;

    let (status, body) = send(&app, empty_request(Method::GET, "/currencies")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert_eq!(body["EUR"]["rate"], 0.9);
}

#[tokio::test]
async fn test_invalid_currency_is_rejected() {
    let (_dir, store, app) = create_test_app();

    for body in [
        json!({"code": "", "rate": 1.0, "name": "Nothing", "symbol": "N"}),
        json!({"code": "ABC", "rate": 0.0, "name": "Zero", "symbol": "Z"}),
        json!({"code": "ABC", "rate": 1.0, "name": "", "symbol": "Z"}),
        json!({"code": "ABC", "rate": 1.0, "name": "Alpha", "symbol": ""}),
    ] {
        let (status, _) = send(&app, json_request(Method::POST, "/currency", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert!(store.currencies().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_unknown_are_not_found() {
    let (_dir, _store, app) = create_test_app();

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/currency/XYZ",
            json!({"rate": 1.0, "name": "Ghost", "symbol": "G"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request(Method::DELETE, "/currency/XYZ")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conversion_is_computed_and_recorded() {
    let (_dir, _store, app) = create_test_app();
    create(&app, "USD", 1.0, "US Dollar", "$").await;
    create(&app, "EUR", 0.9, "Euro", "€").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/conversion",
            json!({"amount": 100.0, "from": "EUR", "to": "usd"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!((body["result"].as_f64().unwrap() - 90.0).abs() < 1e-9);
    assert_eq!(body["from"]["code"], "EUR");
    assert_eq!(body["to"]["code"], "USD");

    let (status, body) = send(&app, empty_request(Method::GET, "/conversions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_conversion_errors() {
    let (_dir, store, app) = create_test_app();
    create(&app, "USD", 1.0, "US Dollar", "$").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/conversion",
            json!({"amount": -1.0, "from": "USD", "to": "USD"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/conversion",
            json!({"amount": 1.0, "from": "USD", "to": "GBP"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("GBP"));

    assert!(store.conversions().is_empty());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (_dir, _store, app) = create_test_app();

    let (status, body) = send(&app, empty_request(Method::GET, "/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/conversion"].is_object());
}

#[tokio::test]
async fn test_queued_mode_reports_closed_queue_as_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let cancel = CancellationToken::new();
    let (ingestor, consumer) = spawn_ingestor(Arc::clone(&store), 1, cancel.clone());
    // Stop the consumer first so the queue no longer accepts anything.
    cancel.cancel();
    consumer.await.unwrap();
    let app = HttpServer::new(CurrencyService::new(store, ingestor)).router();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/currency",
            json!({"code": "USD", "rate": 1.0, "name": "US Dollar", "symbol": "$"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 503);
}

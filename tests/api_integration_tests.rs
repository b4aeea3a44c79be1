//! Integration Tests for the Cache Node API
//!
//! Tests the full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use doc_cache::cache::entry::current_timestamp_ms;
use doc_cache::{api::create_router, AppState, InProcessCache};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = InProcessCache::new(100, Duration::from_secs(300));
    create_router(AppState::new(cache))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_request(key: &str, value: Value, expiration_time: u64) -> Request<Body> {
    let body = json!({"entry": {"value": value, "expiration_time": expiration_time}});
    Request::builder()
        .method("PUT")
        .uri(format!("/entries/{}", key))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn in_one_minute() -> u64 {
    current_timestamp_ms() + 60_000
}

// == PUT Endpoint Tests ==

#[tokio::test]
async fn test_put_endpoint_success() {
    let app = create_test_app();
    let expiration_time = in_one_minute();

    let response = app
        .oneshot(put_request("doc-1", json!({"_id": "doc-1"}), expiration_time))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("doc-1"));
    assert_eq!(json["expiration_time"].as_u64(), Some(expiration_time));
}

#[tokio::test]
async fn test_put_endpoint_invalid_json() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/entries/doc-1")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"entry": {"value": 1}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_put_endpoint_key_too_long() {
    let app = create_test_app();
    let key = "k".repeat(doc_cache::cache::MAX_KEY_LENGTH + 1);

    let response = app
        .oneshot(put_request(&key, json!(1), in_one_minute()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("maximum length"));
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();
    let expiration_time = in_one_minute();

    let put_response = app
        .clone()
        .oneshot(put_request("doc-1", json!({"name": "ada"}), expiration_time))
        .await
        .unwrap();
    assert_eq!(put_response.status(), StatusCode::OK);

    let get_response = app.oneshot(request("GET", "/entries/doc-1")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "doc-1");
    assert_eq!(json["entry"]["value"]["name"], "ada");
    assert_eq!(json["entry"]["expiration_time"].as_u64(), Some(expiration_time));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(request("GET", "/entries/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

#[tokio::test]
async fn test_get_endpoint_returns_expired_entry() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request("stale", json!("old"), 1))
        .await
        .unwrap();

    let response = app.oneshot(request("GET", "/entries/stale")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["entry"]["expiration_time"].as_u64(), Some(1));
}

#[tokio::test]
async fn test_get_endpoint_percent_encoded_uri_key() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request(
            "memory:%2F%2Fusers%2Fdoc-1",
            json!({"_id": "doc-1"}),
            in_one_minute(),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/entries/memory:%2F%2Fusers%2Fdoc-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "memory://users/doc-1");
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request("doc-1", json!(1), in_one_minute()))
        .await
        .unwrap();

    let delete_response = app
        .clone()
        .oneshot(request("DELETE", "/entries/doc-1"))
        .await
        .unwrap();
    assert_eq!(delete_response.status(), StatusCode::OK);

    let get_response = app.oneshot(request("GET", "/entries/doc-1")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_missing_key_is_ok() {
    let app = create_test_app();

    let response = app
        .oneshot(request("DELETE", "/entries/never-stored"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_clear_and_size_endpoints() {
    let app = create_test_app();

    for key in ["a", "b", "c"] {
        app.clone()
            .oneshot(put_request(key, json!(key), in_one_minute()))
            .await
            .unwrap();
    }

    let size = app.clone().oneshot(request("GET", "/size")).await.unwrap();
    assert_eq!(body_to_json(size.into_body()).await["size"], 3);

    let clear = app
        .clone()
        .oneshot(request("DELETE", "/entries"))
        .await
        .unwrap();
    assert_eq!(clear.status(), StatusCode::OK);

    let size = app.oneshot(request("GET", "/size")).await.unwrap();
    assert_eq!(body_to_json(size.into_body()).await["size"], 0);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request("live", json!(1), in_one_minute()))
        .await
        .unwrap();
    app.clone()
        .oneshot(put_request("expired", json!(2), 1))
        .await
        .unwrap();

    // One hit, then two misses: an expired entry and a missing key
    for uri in ["/entries/live", "/entries/expired", "/entries/missing"] {
        app.clone().oneshot(request("GET", uri)).await.unwrap();
    }

    let response = app.oneshot(request("GET", "/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 2);
    assert_eq!(json["total_entries"], 2);
    assert!(json.get("hit_rate").is_some());
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();

    let response = app.oneshot(request("GET", "/get/doc-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

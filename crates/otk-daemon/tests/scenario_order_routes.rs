//! In-process scenario tests for the otk-daemon order endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` against an in-memory store and
//! drives it via `tower::ServiceExt::oneshot` — no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use otk_daemon::{routes, state};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_state() -> Arc<state::AppState> {
    Arc::new(state::AppState::in_memory())
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn aapl_buy() -> serde_json::Value {
    serde_json::json!({
        "symbol": "AAPL",
        "price": 150.5,
        "quantity": 10,
        "order_type": "buy"
    })
}

async fn order_count(st: &Arc<state::AppState>) -> usize {
    let (_, body) = call(routes::build_router(Arc::clone(st)), get("/orders")).await;
    parse_json(body).as_array().expect("orders array").len()
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let (status, body) = call(routes::build_router(make_state()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "otk-daemon");
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_order_defaults_to_pending_and_echoes_fields() {
    let st = make_state();

    let (status, body) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", aapl_buy())).await;
    assert_eq!(status, StatusCode::CREATED);

    let json = parse_json(body);
    assert!(json["id"].as_i64().unwrap() >= 1, "assigned id must be >= 1");
    assert_eq!(json["symbol"], "AAPL");
    assert_eq!(json["price"], 150.5);
    assert_eq!(json["quantity"], 10);
    assert_eq!(json["order_type"], "buy");
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn create_order_honors_explicit_initial_status() {
    let st = make_state();
    let mut payload = aapl_buy();
    payload["status"] = "cancelled".into();

    let (status, body) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parse_json(body)["status"], "cancelled");
}

#[tokio::test]
async fn create_order_with_missing_field_is_400_and_names_it() {
    let st = make_state();
    let mut payload = aapl_buy();
    payload.as_object_mut().unwrap().remove("symbol");

    let (status, body) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        parse_json(body)["error"].as_str().unwrap().contains("symbol"),
        "error should name the missing field"
    );
    assert_eq!(order_count(&st).await, 0, "nothing persisted on failure");
}

#[tokio::test]
async fn create_order_rejects_bad_values() {
    let st = make_state();

    for (field, value) in [
        ("price", serde_json::json!(-1.0)),
        ("quantity", serde_json::json!(0)),
        ("order_type", serde_json::json!("short")),
        ("status", serde_json::json!("shipped")),
        ("symbol", serde_json::json!("")),
    ] {
        let mut payload = aapl_buy();
        payload[field] = value;
        let (status, _) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "bad {field} must be rejected");
    }

    assert_eq!(order_count(&st).await, 0);
}

// ---------------------------------------------------------------------------
// PUT /orders/:id + GET /orders (read-after-write)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_status_is_reflected_in_subsequent_list() {
    let st = make_state();

    let (_, body) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", aapl_buy())).await;
    let id = parse_json(body)["id"].as_i64().unwrap();

    let (status, body) = call(
        routes::build_router(Arc::clone(&st)),
        put(&format!("/orders/{id}?status=completed")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "completed");

    let (_, body) = call(routes::build_router(Arc::clone(&st)), get("/orders")).await;
    let orders = parse_json(body);
    let order = orders
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["id"] == id)
        .expect("order present in list");
    assert_eq!(order["status"], "completed");
}

#[tokio::test]
async fn update_unknown_id_is_404_and_creates_nothing() {
    let st = make_state();
    let _ = call(routes::build_router(Arc::clone(&st)), post_json("/orders", aapl_buy())).await;
    let before = order_count(&st).await;

    let (status, body) = call(
        routes::build_router(Arc::clone(&st)),
        put("/orders/999999?status=completed"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(parse_json(body)["error"]
        .as_str()
        .unwrap()
        .contains("not found"));

    assert_eq!(order_count(&st).await, before, "order count unchanged");
}

#[tokio::test]
async fn update_unknown_id_with_unknown_status_is_404() {
    let st = make_state();
    let (status, body) = call(
        routes::build_router(Arc::clone(&st)),
        put("/orders/999999?status=bogus"),
    )
    .await;
    assert_eq!(
        status,
        StatusCode::NOT_FOUND,
        "unknown id outranks a malformed status"
    );
    assert!(parse_json(body)["error"]
        .as_str()
        .unwrap()
        .contains("not found"));
}

#[tokio::test]
async fn update_with_unknown_status_string_is_400() {
    let st = make_state();
    let (_, body) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", aapl_buy())).await;
    let id = parse_json(body)["id"].as_i64().unwrap();

    let (status, _) = call(
        routes::build_router(Arc::clone(&st)),
        put(&format!("/orders/{id}?status=shipped")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn illegal_transition_out_of_terminal_state_is_400() {
    let st = make_state();
    let (_, body) = call(routes::build_router(Arc::clone(&st)), post_json("/orders", aapl_buy())).await;
    let id = parse_json(body)["id"].as_i64().unwrap();

    let _ = call(
        routes::build_router(Arc::clone(&st)),
        put(&format!("/orders/{id}?status=completed")),
    )
    .await;

    let (status, body) = call(
        routes::build_router(Arc::clone(&st)),
        put(&format!("/orders/{id}?status=cancelled")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse_json(body)["error"]
        .as_str()
        .unwrap()
        .contains("illegal status transition"));
}

// ---------------------------------------------------------------------------
// Unknown routes return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (status, _) = call(routes::build_router(make_state()), get("/does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

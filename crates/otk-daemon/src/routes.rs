//! Axum router and all HTTP/WebSocket handlers for otk-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers stay thin: parse, call the order service, map
//! the result. The WebSocket handler owns the per-connection delivery task
//! that drains the registry queue into the socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use otk_schemas::{NewOrder, Order};
use tracing::{debug, info};

use crate::{
    api_types::{ApiError, HealthResponse, UpdateStatusQuery},
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", put(update_order))
        .route("/ws/orders", get(ws_orders))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /orders
// ---------------------------------------------------------------------------

pub(crate) async fn list_orders(
    State(st): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = st.service.list_orders().await?;
    Ok(Json(orders))
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    Json(new): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = st.service.create_order(new).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// ---------------------------------------------------------------------------
// PUT /orders/:id?status=<new>
// ---------------------------------------------------------------------------

pub(crate) async fn update_order(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(q): Query<UpdateStatusQuery>,
) -> Result<Json<Order>, ApiError> {
    // The service resolves the id before the status string, so an unknown
    // id is a 404 even when the status is malformed.
    let order = st.service.update_order_status(id, &q.status).await?;
    Ok(Json(order))
}

// ---------------------------------------------------------------------------
// GET /ws/orders  (WebSocket)
// ---------------------------------------------------------------------------

pub(crate) async fn ws_orders(
    ws: WebSocketUpgrade,
    State(st): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| stream_order_events(socket, st))
}

/// Per-connection lifecycle: register, drain the event queue into the
/// socket, and watch the inbound half for the peer closing. Either side
/// ending tears the connection down and unregisters it.
async fn stream_order_events(socket: WebSocket, st: Arc<AppState>) {
    let (conn_id, mut events) = st.registry.register();
    info!(conn = %conn_id, live = st.registry.len(), "observer connected");

    let (mut sink, mut inbound) = socket.split();

    loop {
        tokio::select! {
            queued = events.recv() => {
                match queued {
                    Some(payload) => {
                        if sink.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Queue closed: the broadcast engine evicted us.
                    None => break,
                }
            }
            frame = inbound.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Observers only listen; anything else keeps the
                    // connection alive.
                    Some(Ok(other)) => debug!(conn = %conn_id, ?other, "ignoring inbound frame"),
                }
            }
        }
    }

    st.registry.unregister(conn_id);
    info!(conn = %conn_id, live = st.registry.len(), "observer disconnected");
}

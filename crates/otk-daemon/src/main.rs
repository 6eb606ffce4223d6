//! otk-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, connects the order
//! store, builds the shared state, wires middleware, and starts the HTTP
//! server. All route handlers live in `routes.rs`; shared state types live
//! in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use otk_config::StoreBackend;
use otk_daemon::{routes, state};
use otk_db::OrderStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let store = connect_store().await?;
    let shared = Arc::new(state::AppState::new(store));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8890)));
    info!("otk-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

/// Select and prepare the order store from the environment. Postgres gets
/// bounded connect retries plus embedded migrations; `TESTING=true` selects
/// the in-memory store.
async fn connect_store() -> anyhow::Result<OrderStore> {
    match StoreBackend::from_env()? {
        StoreBackend::Postgres(cfg) => {
            let pool = otk_db::connect_with_retries(&cfg).await?;
            otk_db::migrate(&pool).await?;
            info!(
                host = %cfg.host,
                port = cfg.port,
                database = %cfg.database,
                "order store ready (postgres)"
            );
            Ok(OrderStore::postgres(pool))
        }
        StoreBackend::Memory => {
            info!("TESTING mode: embedded in-memory order store");
            Ok(OrderStore::memory())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("OTK_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(tower_http::cors::Any)
}

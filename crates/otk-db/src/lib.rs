//! otk-db
//!
//! The Order Store. One durable `orders` table behind a small CRUD surface;
//! the Postgres backend is used in deployment, the in-memory backend when
//! `TESTING=true` and in unit/scenario tests. Row-level consistency is the
//! store's job; callers get read-after-write semantics per order id.

use std::time::Duration;

use anyhow::{Context, Result};
use otk_config::PgConfig;
use otk_schemas::{Order, OrderDraft, OrderStatus};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;

mod memory;
mod pg;

pub use memory::MemoryStore;

/// Startup connection policy: bounded retries with a fixed delay, then fatal.
/// Steady-state store errors are per-request, never process-fatal.
pub const CONNECT_ATTEMPTS: u32 = 5;
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(i64),
    /// A conditional status write found the row no longer in the expected
    /// prior status: a concurrent update committed first. The caller
    /// re-reads and re-validates.
    #[error("order {id} is no longer {expected}")]
    StaleStatus { id: i64, expected: OrderStatus },
    #[error("order store failure: {0}")]
    Backend(#[from] sqlx::Error),
    /// A persisted row failed to decode (status/order_type outside the closed
    /// sets). Indicates writes that bypassed validation.
    #[error("corrupt order row: {0}")]
    Corrupt(String),
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

/// Backend-dispatching order store. Enum instead of a trait object so the
/// async methods stay plain `async fn`.
pub enum OrderStore {
    Postgres(PgPool),
    Memory(MemoryStore),
}

impl OrderStore {
    pub fn postgres(pool: PgPool) -> Self {
        OrderStore::Postgres(pool)
    }

    pub fn memory() -> Self {
        OrderStore::Memory(MemoryStore::new())
    }

    /// All persisted orders, in id order.
    pub async fn list(&self) -> Result<Vec<Order>, StoreError> {
        match self {
            OrderStore::Postgres(pool) => pg::list(pool).await,
            OrderStore::Memory(mem) => Ok(mem.list().await),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Order, StoreError> {
        match self {
            OrderStore::Postgres(pool) => pg::get(pool, id).await,
            OrderStore::Memory(mem) => mem.get(id).await,
        }
    }

    /// Insert a validated draft; the store assigns the id (≥ 1).
    pub async fn insert(&self, draft: &OrderDraft) -> Result<Order, StoreError> {
        match self {
            OrderStore::Postgres(pool) => pg::insert(pool, draft).await,
            OrderStore::Memory(mem) => Ok(mem.insert(draft).await),
        }
    }

    /// Conditionally overwrite the status of an existing order and return
    /// the updated row. The write lands only if the row is still in
    /// `expected`; otherwise [`StoreError::StaleStatus`], so a legality
    /// check performed against `expected` cannot be invalidated by a
    /// concurrent update between read and write.
    pub async fn update_status(
        &self,
        id: i64,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        match self {
            OrderStore::Postgres(pool) => pg::update_status(pool, id, expected, status).await,
            OrderStore::Memory(mem) => mem.update_status(id, expected, status).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Connect to Postgres, retrying [`CONNECT_ATTEMPTS`] times with a fixed
/// [`CONNECT_RETRY_DELAY`] between attempts. The compose `db` service may
/// still be warming up when the daemon starts.
pub async fn connect_with_retries(cfg: &PgConfig) -> Result<PgPool> {
    let url = cfg.url();
    let mut attempt = 0;
    loop {
        attempt += 1;
        match PgPoolOptions::new().max_connections(10).connect(&url).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                warn!(
                    attempt,
                    remaining = CONNECT_ATTEMPTS - attempt,
                    error = %e,
                    "order store unreachable; retrying in {}s",
                    CONNECT_RETRY_DELAY.as_secs()
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)).with_context(|| {
                    format!("failed to connect to Postgres after {CONNECT_ATTEMPTS} attempts")
                });
            }
        }
    }
}

/// Run embedded SQLx migrations (creates the `orders` table).
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

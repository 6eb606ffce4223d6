//! otk-config
//!
//! Environment-driven configuration for the order tracker. Store backend
//! selection and Postgres credentials only; the daemon bind address is read
//! in `main` next to the server setup.

use anyhow::{Context, Result};

pub const ENV_TESTING: &str = "TESTING";
pub const ENV_PG_USER: &str = "POSTGRES_USER";
pub const ENV_PG_PASSWORD: &str = "POSTGRES_PASSWORD";
pub const ENV_PG_DB: &str = "POSTGRES_DB";
pub const ENV_PG_HOST: &str = "POSTGRES_HOST";
pub const ENV_PG_PORT: &str = "POSTGRES_PORT";

/// Postgres connection parameters, with deployment defaults matching the
/// docker-compose service layout (`db:5432`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl PgConfig {
    pub fn from_env() -> Result<Self> {
        let port_raw = env_or(ENV_PG_PORT, "5432");
        let port: u16 = port_raw
            .parse()
            .with_context(|| format!("invalid {ENV_PG_PORT}: {port_raw}"))?;

        Ok(Self {
            user: env_or(ENV_PG_USER, "postgres"),
            password: env_or(ENV_PG_PASSWORD, "1234"),
            database: env_or(ENV_PG_DB, "orders"),
            host: env_or(ENV_PG_HOST, "db"),
            port,
        })
    }

    /// Connection URL for the sqlx Postgres driver.
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// Which order store the daemon runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(PgConfig),
    /// Embedded in-memory store, selected by `TESTING=true`.
    Memory,
}

impl StoreBackend {
    pub fn from_env() -> Result<Self> {
        if env_or(ENV_TESTING, "false").eq_ignore_ascii_case("true") {
            return Ok(StoreBackend::Memory);
        }
        Ok(StoreBackend::Postgres(PgConfig::from_env()?))
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

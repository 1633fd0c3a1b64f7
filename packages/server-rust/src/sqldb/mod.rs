//! PostgreSQL connectivity: pool setup, status checks, migrations, the
//! store-level error taxonomy, transactions, and WHERE-clause building.

pub mod filter;
pub mod tx;

pub use filter::WhereClause;
pub use tx::{Conn, Target, Tx};

use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::info;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors produced by every `Storer` implementation.
///
/// Driver errors are classified on conversion so the business layer can map
/// uniqueness and foreign-key violations without inspecting SQLSTATE codes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("duplicated entry: {0}")]
    Duplicate(String),
    #[error("foreign key violation: {0}")]
    ForeignKey(String),
    #[error("unknown order field: {0}")]
    UnknownOrder(String),
    #[error("transaction already finished")]
    TxClosed,
    #[error("database: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Duplicate(db.constraint().unwrap_or_default().to_string())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                Self::ForeignKey(db.constraint().unwrap_or_default().to_string())
            }
            other => Self::Database(other),
        }
    }
}

// ---------------------------------------------------------------------------
// DbConfig
// ---------------------------------------------------------------------------

/// Connection settings for the PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Upper bound on pooled connections.
    pub max_open_conns: u32,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout: Duration,
    /// Connect without TLS (local development).
    pub disable_tls: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            max_open_conns: 10,
            acquire_timeout: Duration::from_secs(5),
            disable_tls: true,
        }
    }
}

impl DbConfig {
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.disable_tls {
            PgSslMode::Disable
        } else {
            PgSslMode::Require
        };
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(ssl_mode)
    }
}

// ---------------------------------------------------------------------------
// Db
// ---------------------------------------------------------------------------

/// Shared handle to the connection pool. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Opens the pool. Connections are established lazily on first use, so
    /// an unreachable database surfaces on the first query or status check.
    #[must_use]
    pub fn open(config: &DbConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_open_conns)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.connect_options());
        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            max_conns = config.max_open_conns,
            "database pool configured"
        );
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips a trivial query to confirm the database answers.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the database is unreachable.
    pub async fn status_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT true")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
    }

    /// Applies every pending embedded migration.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails or the database is unreachable.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        MIGRATOR.run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    /// Starts a transaction on a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired.
    pub async fn begin(&self) -> Result<Tx, StoreError> {
        Tx::begin(&self.pool).await
    }
}

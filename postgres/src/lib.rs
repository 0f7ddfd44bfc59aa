//! PostgreSQL storage for the Fieldsport booking platform.
//!
//! [`PostgresStore`] is the production implementation of
//! `fieldsport_core::PlatformStore`. Every check-then-act operation
//! (booking creation, session transitions, report filing) runs inside a
//! single transaction with `SELECT … FOR UPDATE` row locks, so two
//! near-simultaneous requests for the same hunter+date or the same
//! field+date cannot both pass their checks.
//!
//! # Example
//!
//! ```no_run
//! use fieldsport_postgres::PostgresStore;
//! use fieldsport_core::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::connect(
//!     "postgres://localhost/fieldsport",
//!     Arc::new(SystemClock),
//! )
//! .await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod rows;
mod store;

use fieldsport_core::error::{PlatformError, Result};
use fieldsport_core::Clock;
use sqlx::PgPool;
use std::sync::Arc;

/// PostgreSQL-backed platform store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Connects to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Persistence`] if the connection fails.
    pub async fn connect(url: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| PlatformError::Persistence(format!("failed to connect: {e}")))?;
        Ok(Self::new(pool, clock))
    }

    /// Connects with explicit pool sizing and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Persistence`] if the connection fails.
    pub async fn connect_with(
        url: &str,
        max_connections: u32,
        connect_timeout: std::time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(url)
            .await
            .map_err(|e| PlatformError::Persistence(format!("failed to connect: {e}")))?;
        Ok(Self::new(pool, clock))
    }

    /// Runs the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PlatformError::Persistence(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

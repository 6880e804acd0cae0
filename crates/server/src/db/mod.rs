//! Database access for the beanhouse backend.
//!
//! Storage is an embedded SQLite database reached through sqlx. All
//! queries use the runtime-checked query forms; schema lives in
//! `migrations/` and is embedded via [`sqlx::migrate!`].
//!
//! ## Tables
//!
//! - `member` - registered members and their API keys
//! - `product` - the catalog
//! - `member_order` / `member_order_item` - per-window member orders
//! - `guest_order` / `guest_order_item` - per-window guest orders
//!
//! Both order tables carry a UNIQUE `(owner, window_start)` constraint;
//! repositories surface violations of it as [`RepositoryError::Conflict`]
//! so the service layer can fall back to a merge.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub mod members;
pub mod orders;
pub mod products;

pub use members::MemberRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Embedded schema migrations, applied at startup.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. unique email, unique order window).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// The database file is created if it does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot
/// be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Map a sqlx error to [`RepositoryError::Conflict`] when it is a unique
/// constraint violation, passing everything else through as `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    MIGRATOR.run(&pool).await.expect("migrations");
    pool
}

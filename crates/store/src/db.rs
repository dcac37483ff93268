//! Database connection and pool management.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Readers (payload fetch, catalog listing) outnumber writers, so a small
// pool is enough to keep a viewer fetch from queueing behind an upload.
const MAX_CONNECTIONS: u32 = 4;

/// Database connection pool for the document store.
///
/// This is the main entry point for interacting with the store. Opening is
/// done exactly once per instance; the pool is cheaply cloneable and shared,
/// so concurrent first-users converge on the same underlying connections
/// and migrations never run twice concurrently.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Unavailable)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open the document store at the given path.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    /// Calling this twice for the same path yields two handles onto the same
    /// durable state; migrations are idempotent so the second open is a
    /// no-op upgrade.
    ///
    /// Fails with [`ErrorKind::Unavailable`] when the host denies access to
    /// the backing file, and [`ErrorKind::Migration`] when the schema
    /// upgrade itself fails - both are fatal to initialization.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = Self::base_options().filename(path).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // In-memory databases must be limited to one connection, otherwise
        // parallel connections see separate empty databases.
        Self::new(options, Some(1)).await
    }

    /// Base connection options shared between file and in-memory databases.
    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // WAL keeps payload fetches readable while an upload commits
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            // Required for the records -> payloads ON DELETE CASCADE
            .foreign_keys(true)
            // PRAGMA synchronous = NORMAL (balance between safety and speed)
            .synchronous(SqliteSynchronous::Normal)
            // PRAGMA busy_timeout = 1500ms
            // Uploads write multi-megabyte blobs; give a concurrent writer
            // time to finish instead of surfacing SQLITE_BUSY immediately.
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    /// Run database migrations.
    ///
    /// This is called automatically by `connect` and `connect_in_memory`,
    /// but can be called manually if needed.
    #[instrument("performing database migrations")]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This is useful for running custom queries or transactions.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    ///
    /// This waits for all connections to be returned to the pool and then
    /// closes them. After calling this, the Database instance should not
    /// be used.
    pub async fn close(&self) {
        // Let SQLite update query planner statistics
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.pool().is_closed());
        db.close().await;
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.db");
        let db = Database::connect(&path).await.unwrap();
        assert!(path.exists());
        db.close().await;
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        // Running migrate again should succeed (already applied)
        db.migrate().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_reopen_is_idempotent() {
        // A second connect to the same file must converge on the same
        // schema rather than failing or double-migrating.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.db");
        let first = Database::connect(&path).await.unwrap();
        first.close().await;
        let second = Database::connect(&path).await.unwrap();
        second.close().await;
    }

    #[tokio::test]
    async fn test_pragmas_are_applied() {
        let db = Database::connect_in_memory().await.unwrap();
        let row: (i64,) = sqlx::query_as("PRAGMA foreign_keys").fetch_one(db.pool()).await.unwrap();
        assert_eq!(row.0, 1, "foreign_keys should be ON");
        db.close().await;
    }
}

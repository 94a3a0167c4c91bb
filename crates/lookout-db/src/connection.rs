//! Database connection management.
//!
//! Opens a `SQLite` pool in WAL mode so status polls never block the job
//! writers.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Maximum pooled connections.
pub const MAX_CONNECTIONS: u32 = 5;

/// Open a connection pool for the database at `path`, creating the file and
/// its parent directory if needed.
///
/// # Errors
/// Returns `DatabaseError::Open` if the path is unusable or the pool cannot
/// connect.
pub async fn open_pool(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            DatabaseError::Open(format!(
                "failed to open pool at {}: {e}",
                path.display()
            ))
        })?;

    tracing::info!("Database pool opened at {}", path.display());

    Ok(pool)
}

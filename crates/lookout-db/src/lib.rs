//! Lookout Database Layer
//!
//! Provides `SQLite` persistence for search jobs. Uses `SQLx` with embedded
//! migrations and a WAL-mode connection pool.
//!
//! # Example
//!
//! ```ignore
//! use lookout_db::Database;
//! use lookout_core::EmailAddress;
//!
//! let db = Database::open("lookout.db").await?;
//! let job = db.jobs().init(EmailAddress::parse("test@example.com")?).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod jobs;
pub mod migrations;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use jobs::{JobStore, INTERRUPTED_MESSAGE};

use sqlx::{Pool, Sqlite};
use std::path::Path;

/// High-level database handle: an open, migrated pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and run pending
    /// migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Job store sharing this database's pool.
    #[must_use]
    pub fn jobs(&self) -> JobStore {
        JobStore::new(self.pool.clone())
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

pub mod notifications;
pub mod weights;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub use weights::WeightRecord;

/// Storage capabilities the handlers rely on.
///
/// Implementations must tolerate concurrent calls: several handlers for the
/// same or different users can be in flight at once.
#[async_trait]
pub trait WeightStore: Send + Sync + 'static {
    /// Most recent record for the user, if any
    async fn latest_weight(&self, user_id: u64) -> Result<Option<WeightRecord>>;

    /// Up to `limit` records for the user, newest first
    async fn recent_weights(&self, user_id: u64, limit: usize) -> Result<Vec<WeightRecord>>;

    async fn set_weight(&self, user_id: u64, value: f64, at: DateTime<Utc>) -> Result<()>;

    async fn set_notifications(&self, user_id: u64, enabled: bool) -> Result<()>;

    /// Users without an explicit preference are treated as enabled
    async fn notifications_enabled(&self, user_id: u64) -> Result<bool>;
}

/// Thread-safe SQLite store for weight history and notification preferences
#[derive(Clone)]
pub struct MemoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl MemoryStore {
    /// Open or create the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        // Run migrations on the raw connection before wrapping in Mutex.
        Self::run_migrations(&conn)?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        info!("Weight store initialized at: {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            -- Weight history, one row per submitted value
            CREATE TABLE IF NOT EXISTS weights (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                value REAL NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_weights_user
                ON weights(user_id, recorded_at);

            -- Reminder opt-in/opt-out, absent row means enabled
            CREATE TABLE IF NOT EXISTS notify_prefs (
                user_id INTEGER PRIMARY KEY,
                enabled INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )
        .context("Failed to run migrations")?;

        Ok(())
    }
}

#[async_trait]
impl WeightStore for MemoryStore {
    async fn latest_weight(&self, user_id: u64) -> Result<Option<WeightRecord>> {
        Ok(self.load_weights(user_id, 1).await?.into_iter().next())
    }

    async fn recent_weights(&self, user_id: u64, limit: usize) -> Result<Vec<WeightRecord>> {
        self.load_weights(user_id, limit).await
    }

    async fn set_weight(&self, user_id: u64, value: f64, at: DateTime<Utc>) -> Result<()> {
        self.insert_weight(user_id, value, at).await
    }

    async fn set_notifications(&self, user_id: u64, enabled: bool) -> Result<()> {
        self.save_notify_pref(user_id, enabled).await
    }

    async fn notifications_enabled(&self, user_id: u64) -> Result<bool> {
        Ok(self.load_notify_pref(user_id).await?.unwrap_or(true))
    }
}

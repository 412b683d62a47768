use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use super::MemoryStore;

impl MemoryStore {
    /// Store the reminder preference for a user. Repeating the same value is a no-op.
    pub async fn save_notify_pref(&self, user_id: u64, enabled: bool) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO notify_prefs (user_id, enabled, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(user_id) DO UPDATE SET
                enabled = excluded.enabled,
                updated_at = excluded.updated_at",
            rusqlite::params![user_id as i64, enabled],
        )
        .context("Failed to store notification preference")?;
        Ok(())
    }

    pub async fn load_notify_pref(&self, user_id: u64) -> Result<Option<bool>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT enabled FROM notify_prefs WHERE user_id = ?1",
            rusqlite::params![user_id as i64],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to load notification preference")
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::{MemoryStore, WeightStore};

    #[tokio::test]
    async fn test_default_is_enabled() {
        let store = MemoryStore::open_in_memory().unwrap();
        assert!(store.notifications_enabled(1).await.unwrap());
        assert_eq!(store.load_notify_pref(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_toggle_is_idempotent() {
        let store = MemoryStore::open_in_memory().unwrap();
        store.set_notifications(1, false).await.unwrap();
        store.set_notifications(1, false).await.unwrap();
        assert!(!store.notifications_enabled(1).await.unwrap());

        store.set_notifications(1, true).await.unwrap();
        assert!(store.notifications_enabled(1).await.unwrap());
        // Other users are unaffected
        assert_eq!(store.load_notify_pref(2).await.unwrap(), None);
    }
}

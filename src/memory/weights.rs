use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::MemoryStore;

/// A single weight submission
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRecord {
    pub user_id: u64,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

impl MemoryStore {
    /// Append a weight to the user's history
    pub async fn insert_weight(&self, user_id: u64, value: f64, at: DateTime<Utc>) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO weights (id, user_id, value, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![&id, user_id as i64, value, at.to_rfc3339()],
        )
        .context("Failed to save weight")?;

        Ok(())
    }

    /// Load the user's history, newest first. Equal timestamps fall back to
    /// insertion order.
    pub async fn load_weights(&self, user_id: u64, limit: usize) -> Result<Vec<WeightRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT user_id, value, recorded_at
             FROM weights
             WHERE user_id = ?1
             ORDER BY recorded_at DESC, rowid DESC
             LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(rusqlite::params![user_id as i64, limit as i64], |row| {
                let user_id: i64 = row.get(0)?;
                let value: f64 = row.get(1)?;
                let recorded_at: String = row.get(2)?;
                Ok((user_id, value, recorded_at))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load weights")?;

        rows.into_iter()
            .map(|(user_id, value, recorded_at)| {
                let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                    .with_context(|| format!("Invalid timestamp in weights: {}", recorded_at))?
                    .with_timezone(&Utc);
                Ok(WeightRecord {
                    user_id: user_id as u64,
                    value,
                    recorded_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::WeightStore;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_latest_weight_empty() {
        let store = MemoryStore::open_in_memory().unwrap();
        assert_eq!(store.latest_weight(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::open_in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        store.set_weight(42, 72.5, at).await.unwrap();

        let record = store.latest_weight(42).await.unwrap().unwrap();
        assert_eq!(record.user_id, 42);
        assert_eq!(record.value, 72.5);
        assert_eq!(record.recorded_at, at);
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = MemoryStore::open_in_memory().unwrap();
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap();

        // Insert out of order to check sorting by timestamp
        store.set_weight(7, 80.0, sunday).await.unwrap();
        store.set_weight(7, 81.2, monday).await.unwrap();

        let history = store.recent_weights(7, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].value, 80.0);
        assert_eq!(history[1].value, 81.2);
    }

    #[tokio::test]
    async fn test_same_timestamp_uses_insertion_order() {
        let store = MemoryStore::open_in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        store.set_weight(7, 80.0, at).await.unwrap();
        store.set_weight(7, 79.5, at).await.unwrap();

        let latest = store.latest_weight(7).await.unwrap().unwrap();
        assert_eq!(latest.value, 79.5);
    }

    #[tokio::test]
    async fn test_concurrent_writes_stay_isolated_by_user() {
        let store = MemoryStore::open_in_memory().unwrap();
        let mut tasks = Vec::new();
        for user_id in 1..=20u64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .set_weight(user_id, 50.0 + user_id as f64, Utc::now())
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for user_id in 1..=20u64 {
            let history = store.recent_weights(user_id, 10).await.unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].user_id, user_id);
            assert_eq!(history[0].value, 50.0 + user_id as f64);
        }
    }
}

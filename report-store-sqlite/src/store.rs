use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use report_core::{KeyValueStore, StoreError};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// Key-value slots in a single `draft_kv` table.
pub struct SqliteStore {
    pool: SqlitePool,
    quota_bytes: Option<usize>,
}

impl SqliteStore {
    /// Connect to `database_url` (sqlx form, e.g. `sqlite:report.db?mode=rwc`).
    ///
    /// One connection is kept open for the life of the store so that
    /// `sqlite::memory:` databases survive between calls.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {database_url}"))?;
        Ok(Self {
            pool,
            quota_bytes: None,
        })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            quota_bytes: None,
        }
    }

    /// Cap the total bytes of all keys and values.
    pub fn with_quota(
        mut self,
        quota_bytes: Option<usize>,
    ) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM draft_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if let Some(quota) = self.quota_bytes {
            let others: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM draft_kv WHERE key <> ?",
            )
            .bind(key)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

            let needed = usize::try_from(others).unwrap_or(usize::MAX) + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        sqlx::query(
            "INSERT INTO draft_kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(key, bytes = value.len(), "slot written");
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM draft_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_test_db() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let store = SqliteStore::new_with_pool(pool).await;
        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");
        store
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = setup_test_db().await;

        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = setup_test_db().await;

        store.set("draft", "first").await.unwrap();
        store.set("draft", "second").await.unwrap();

        assert_eq!(store.get("draft").await.unwrap().as_deref(), Some("second"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM draft_kv")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn set_records_update_time() {
        let store = setup_test_db().await;
        let before = Utc::now();

        store.set("draft", "{}").await.unwrap();

        let stamp: DateTime<Utc> =
            sqlx::query_scalar("SELECT updated_at FROM draft_kv WHERE key = 'draft'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert!(stamp >= before - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = setup_test_db().await;
        store.set("draft", "x").await.unwrap();

        store.remove("draft").await.unwrap();
        store.remove("draft").await.unwrap();

        assert_eq!(store.get("draft").await.unwrap(), None);
    }

    #[tokio::test]
    async fn quota_counts_other_keys_and_keeps_old_value() {
        let store = setup_test_db().await.with_quota(Some(20));
        store.set("a", "123456789").await.unwrap(); // 10 bytes

        // 10 others + 1 + 10 = 21
        let err = store.set("b", "0123456789").await.unwrap_err();
        assert_eq!(
            err,
            StoreError::QuotaExceeded {
                needed: 21,
                quota: 20
            }
        );
        assert_eq!(store.get("b").await.unwrap(), None);

        // replacing "a" itself does not count its old value
        store.set("a", "0123456789012345678").await.unwrap();
    }

    #[tokio::test]
    async fn quota_counts_bytes_not_characters() {
        let store = setup_test_db().await.with_quota(Some(4));

        // "é" is two bytes in UTF-8
        assert!(matches!(
            store.set("k", "éé").await,
            Err(StoreError::QuotaExceeded { needed: 5, .. })
        ));
        assert!(store.set("k", "é").await.is_ok());
    }
}

use async_trait::async_trait;
use report_core::{KeyValueStore, StoreConfig, StoreError, StoreFactory};
use tracing::info;

use crate::store::SqliteStore;

/// Map a user-facing connection string to an sqlx URL.
///
/// * `":memory:"` → `sqlite::memory:`
/// * anything already starting with `sqlite:` is passed through
/// * a bare path → `sqlite:<path>?mode=rwc` (file created if missing)
pub fn connection_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" | "" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite:{path}?mode=rwc"),
    }
}

/// [`StoreFactory`] for SQLite.
///
/// ```rust,no_run
/// use report_core::StoreRegistry;
/// use report_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database and bring its schema up to date.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn KeyValueStore>, StoreError> {
        let url = connection_url(&config.connection_string);
        let store = SqliteStore::new(&url)
            .await
            .map_err(|e| StoreError::Connection(format!("{e:#}")))?
            .with_quota(config.quota_bytes);
        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Database(format!("{e:#}")))?;
        info!(url, "sqlite draft store ready");
        Ok(Box::new(store))
    }
}

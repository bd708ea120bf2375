use async_trait::async_trait;
use savings_core::store::{SnapshotStore, StoreConfig, StoreError, StoreFactory};
use tracing::info;

use crate::repository::SqliteSnapshotStore;

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`savings_core::store::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use savings_core::store::StoreRegistry;
/// use savings_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::default();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"savings.db"`. The file is created if it
    ///   does not exist.
    /// * A sqlx URL, e.g. `"sqlite:savings.db?mode=rwc"`.
    /// * `":memory:"`, an ephemeral database.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        let store = SqliteSnapshotStore::new(&config.connection_string).await?;
        store.run_migrations().await?;
        info!(database = %config.connection_string, "opened sqlite snapshot store");
        Ok(Box::new(store))
    }
}

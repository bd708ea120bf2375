use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use savings_core::store::{SnapshotStore, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// [`SnapshotStore`] backed by a single SQLite table.
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

/// Accepts a sqlx URL (`sqlite:savings.db`), `:memory:`, or a bare path.
fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions, StoreError> {
    let options = if connection_string.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(connection_string)
            .map_err(|e| StoreError::Configuration(e.to_string()))?
    } else if connection_string == ":memory:" {
        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Configuration(e.to_string()))?
    } else {
        SqliteConnectOptions::new().filename(connection_string)
    };
    Ok(options.create_if_missing(true))
}

impl SqliteSnapshotStore {
    /// Opens (creating if needed) the database at `connection_string`.
    ///
    /// The pool holds one long-lived connection so an in-memory database
    /// survives for the life of the store.
    pub async fn new(connection_string: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options(connection_string)?)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// When `key` was last written.
    pub async fn saved_at(
        &self,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT updated_at FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        row.map(|(updated_at,)| parse_datetime(&updated_at)).transpose()
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Storage(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT payload FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(row.map(|(payload,)| payload))
    }

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query(
            "INSERT INTO snapshots (key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        debug!(key, bytes = payload.len(), "snapshot saved");
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        debug!(key, removed = result.rows_affected(), "snapshot removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_test_db() -> SqliteSnapshotStore {
        let store = SqliteSnapshotStore::new(":memory:")
            .await
            .expect("Failed to create in-memory database");
        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");
        store
    }

    #[tokio::test]
    async fn test_load_missing_key_is_none() {
        let store = setup_test_db().await;

        assert_eq!(store.load("savings-estimator:v3").await, Ok(None));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = setup_test_db().await;

        store
            .save("savings-estimator:v3", r#"{"wifi":{}}"#)
            .await
            .expect("Should save snapshot");

        let payload = store.load("savings-estimator:v3").await;
        assert_eq!(payload, Ok(Some(r#"{"wifi":{}}"#.to_string())));
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_key() {
        let store = setup_test_db().await;

        store.save("k", "first").await.expect("Should save");
        store.save("k", "second").await.expect("Should overwrite");

        assert_eq!(store.load("k").await, Ok(Some("second".to_string())));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM snapshots")
            .fetch_one(store.pool())
            .await
            .expect("Should count rows");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_remove_deletes_key() {
        let store = setup_test_db().await;
        store.save("k", "payload").await.expect("Should save");

        store.remove("k").await.expect("Should remove");

        assert_eq!(store.load("k").await, Ok(None));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let store = setup_test_db().await;

        assert_eq!(store.remove("never-written").await, Ok(()));
    }

    #[tokio::test]
    async fn test_saved_at_tracks_writes() {
        let store = setup_test_db().await;
        assert_eq!(store.saved_at("k").await, Ok(None));

        let before = Utc::now() - chrono::Duration::seconds(1);
        store.save("k", "payload").await.expect("Should save");

        let saved_at = store
            .saved_at("k")
            .await
            .expect("Should read timestamp")
            .expect("Timestamp should exist");
        assert!(saved_at >= before);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let store = setup_test_db().await;

        assert_eq!(store.run_migrations().await, Ok(()));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2025-03-01 12:30:00").is_ok());
        assert!(parse_datetime("2025-03-01T12:30:00").is_ok());
        assert!(parse_datetime("2025-03-01 12:30:00.125").is_ok());
        assert!(matches!(parse_datetime("yesterday"), Err(StoreError::Storage(_))));
    }
}

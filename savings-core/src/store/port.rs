use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Keyed storage for serialized portfolio snapshots.
///
/// The core owns the key layout (see [`crate::reconcile::SNAPSHOT_KEY`]);
/// adapters only move strings.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError>;

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), StoreError>;

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StoreError>;
}

/// The shareable location (URL) the session is viewed at.
#[async_trait]
pub trait ShareableLocation: Send + Sync {
    async fn current(&self) -> Result<String, StoreError>;

    /// Replaces the location in place. Implementations must not create a
    /// new history entry.
    async fn replace(
        &self,
        url: &str,
    ) -> Result<(), StoreError>;
}

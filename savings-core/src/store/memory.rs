use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::port::{ShareableLocation, SnapshotStore, StoreError};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// Process-local [`SnapshotStore`]. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `key`, for seeding a scenario.
    pub fn with_entry(
        self,
        key: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), payload.into());
        }
        self
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Process-local [`ShareableLocation`] holding a single URL.
///
/// Replacing overwrites the URL; there is no history to grow.
#[derive(Debug)]
pub struct MemoryLocation {
    url: Mutex<String>,
    replacements: AtomicUsize,
}

impl MemoryLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Mutex::new(url.into()),
            replacements: AtomicUsize::new(0),
        }
    }

    /// The current URL, or an empty string if the lock is poisoned.
    pub fn url(&self) -> String {
        self.url.lock().map(|url| url.clone()).unwrap_or_default()
    }

    /// Number of in-place replacements performed so far.
    pub fn replacements(&self) -> usize {
        self.replacements.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ShareableLocation for MemoryLocation {
    async fn current(&self) -> Result<String, StoreError> {
        let url = self.url.lock().map_err(poisoned)?;
        Ok(url.clone())
    }

    async fn replace(
        &self,
        url: &str,
    ) -> Result<(), StoreError> {
        let mut current = self.url.lock().map_err(poisoned)?;
        *current = url.to_string();
        self.replacements.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;

use super::memory::MemorySnapshotStore;
use super::port::{SnapshotStore, StoreError};

/// The `[store]` config section.
///
/// `backend` selects a registered [`StoreFactory`]; `connection_string` is
/// handed to it as is.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `memory`   | ignored                             |
/// | `sqlite`   | `savings.db`, `:memory:`            |
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "savings.db".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`StoreRegistry`] at startup.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// Name used in `StoreConfig::backend`.
    fn backend_name(&self) -> &'static str;

    /// Opens the backing storage, creating it when missing.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError>;
}

/// [`StoreFactory`] for the process-local [`MemorySnapshotStore`].
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        Ok(Box::new(MemorySnapshotStore::new()))
    }
}

/// Looks up snapshot store backends by name.
pub struct StoreRegistry {
    factories: HashMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Adds `factory`, replacing one registered under the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn StoreFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a store with the factory named by `config.backend`.
    ///
    /// Fails with [`StoreError::Configuration`] for an unregistered name;
    /// otherwise returns whatever the factory returns.
    pub async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn SnapshotStore>, StoreError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                StoreError::Configuration(format!(
                    "no snapshot store backend named '{}' (registered: {})",
                    config.backend,
                    self.available_backends().join(", ")
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for StoreRegistry {
    /// A registry with the `memory` backend registered.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryStoreFactory));
        registry
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    // ── spy factory ──────────────────────────────────────────────────────
    // Records whether it was asked to create a store.
    struct SpyFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl StoreFactory for SpyFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            _config: &StoreConfig,
        ) -> Result<Box<dyn SnapshotStore>, StoreError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(MemorySnapshotStore::new()))
        }
    }

    fn config(backend: &str) -> StoreConfig {
        StoreConfig {
            backend: backend.to_string(),
            connection_string: String::new(),
        }
    }

    #[tokio::test]
    async fn routes_to_matching_factory() {
        let called = Arc::new(AtomicBool::new(false));
        let mut registry = StoreRegistry::new();
        registry.register(Box::new(SpyFactory {
            name: "spy",
            called: called.clone(),
        }));

        let result = registry.create(&config("spy")).await;

        assert!(result.is_ok());
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_backend_is_a_configuration_error() {
        let registry = StoreRegistry::default();

        let result = registry.create(&config("postgres")).await;

        match result {
            Err(StoreError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("memory"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn available_backends_are_sorted() {
        let mut registry = StoreRegistry::default();
        registry.register(Box::new(SpyFactory {
            name: "alpha",
            called: Arc::new(AtomicBool::new(false)),
        }));

        assert_eq!(registry.available_backends(), vec!["alpha", "memory"]);
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = StoreRegistry::default();
        registry.register(Box::new(MemoryStoreFactory));

        assert_eq!(registry.available_backends(), vec!["memory"]);
    }

    #[tokio::test]
    async fn memory_backend_creates_empty_store() {
        let store = StoreRegistry::default()
            .create(&config("memory"))
            .await
            .expect("memory backend should be registered");

        assert_eq!(store.load("anything").await, Ok(None));
    }
}

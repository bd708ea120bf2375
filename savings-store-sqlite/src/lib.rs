//! SQLite backend for the savings estimator's snapshot store.

mod factory;
mod repository;

pub use factory::SqliteStoreFactory;
pub use repository::SqliteSnapshotStore;

pub mod factory;
pub mod memory;
pub mod port;

pub use factory::{MemoryStoreFactory, StoreConfig, StoreFactory, StoreRegistry};
pub use memory::{MemoryLocation, MemorySnapshotStore};
pub use port::{ShareableLocation, SnapshotStore, StoreError};

pub mod draft;
pub mod factory;
pub mod kv;
pub mod memory;

pub use draft::{DRAFT_KEY, DraftError, DraftStore};
pub use factory::{StoreConfig, StoreFactory, StoreRegistry};
pub use kv::{KeyValueStore, StoreError};
pub use memory::{MemoryStore, MemoryStoreFactory};

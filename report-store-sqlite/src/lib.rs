mod factory;
mod store;

pub use factory::{SqliteStoreFactory, connection_url};
pub use store::SqliteStore;

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::kv::{KeyValueStore, StoreError};

/// Which backend holds the draft and how to reach it.
///
/// `connection_string` is a file path or `:memory:` for `sqlite` and is
/// ignored by `memory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: String,
    pub connection_string: String,
    /// Total bytes the backend may hold; `None` means unbounded.
    pub quota_bytes: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            connection_string: String::new(),
            quota_bytes: None,
        }
    }
}

/// Opens one storage backend.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn KeyValueStore>, StoreError>;
}

/// Backends known to the binary, by name.
#[derive(Default)]
pub struct StoreRegistry {
    factories: BTreeMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Box<dyn StoreFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Open the backend named by `config.backend`.
    pub async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn KeyValueStore>, StoreError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(StoreError::Configuration(format!(
                "unknown backend '{}'; available: {}",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStoreFactory;

    struct Unreachable;

    #[async_trait]
    impl StoreFactory for Unreachable {
        fn backend_name(&self) -> &'static str {
            "sqlite"
        }

        async fn create(&self, config: &StoreConfig) -> Result<Box<dyn KeyValueStore>, StoreError> {
            Err(StoreError::Connection(format!("cannot open {}", config.connection_string)))
        }
    }

    fn registry() -> StoreRegistry {
        let mut registry = StoreRegistry::new();
        registry.register(Box::new(Unreachable));
        registry.register(Box::new(MemoryStoreFactory));
        registry
    }

    fn backend(name: &str) -> StoreConfig {
        StoreConfig {
            backend: name.to_string(),
            connection_string: "draft.db".to_string(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn default_config_is_unbounded_memory() {
        let config = StoreConfig::default();

        assert_eq!(config.backend, "memory");
        assert_eq!(config.quota_bytes, None);
    }

    #[test]
    fn backends_are_listed_by_name() {
        assert!(StoreRegistry::new().available_backends().is_empty());
        assert_eq!(registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn named_backend_opens_a_working_store() {
        let kv = registry().create(&backend("memory")).await.unwrap();

        kv.set("k", "v").await.unwrap();

        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn quota_reaches_the_backend() {
        let config = StoreConfig {
            quota_bytes: Some(4),
            ..backend("memory")
        };
        let kv = registry().create(&config).await.unwrap();

        assert!(matches!(
            kv.set("key", "too long").await,
            Err(StoreError::QuotaExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_backend_lists_the_known_ones() {
        match registry().create(&backend("redis")).await {
            Err(StoreError::Configuration(msg)) => {
                assert_eq!(msg, "unknown backend 'redis'; available: memory, sqlite");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("redis is not registered"),
        }
    }

    #[tokio::test]
    async fn backend_failure_is_passed_through() {
        let err = registry().create(&backend("sqlite")).await.err();

        assert_eq!(
            err,
            Some(StoreError::Connection("cannot open draft.db".to_string()))
        );
    }
}

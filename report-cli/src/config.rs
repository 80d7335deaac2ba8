//! Settings from `inspection-report.toml`, the environment and the command
//! line, applied in that order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use report_core::{CompressOptions, StoreConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE: &str = "inspection-report.toml";
pub const ENV_STORE: &str = "INSPECTION_REPORT_STORE";
pub const ENV_DB: &str = "INSPECTION_REPORT_DB";

/// 5 MiB, the usual browser storage budget.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub images: ImageSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Registered backend name: `sqlite` or `memory`.
    pub backend: String,
    /// File path for SQLite, or `:memory:`.
    pub connection_string: String,
    /// Byte budget for stored drafts. `None` means unlimited.
    pub quota_bytes: Option<usize>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "inspection-report.db".to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub max_width: u32,
    pub quality: f32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        let defaults = CompressOptions::default();
        Self {
            max_width: defaults.max_width,
            quality: defaults.quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Where exported PDFs are written when `--out` is not given.
    pub directory: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In config file: {}", path.display()))
    }

    /// Read `explicit` if given (it must exist), else `inspection-report.toml`
    /// in the working directory if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let local = Path::new(CONFIG_FILE);
        if local.is_file() {
            debug!(path = %local.display(), "loading config file");
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        if let Some(backend) = lookup(ENV_STORE).filter(|v| !v.is_empty()) {
            self.store.backend = backend;
        }
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.store.connection_string = db;
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_cli(
        &mut self,
        backend: Option<String>,
        db: Option<String>,
    ) {
        if let Some(backend) = backend {
            self.store.backend = backend;
        }
        if let Some(db) = db {
            self.store.connection_string = db;
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.store.backend.clone(),
            connection_string: self.store.connection_string.clone(),
            quota_bytes: self.store.quota_bytes,
        }
    }

    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_width: self.images.max_width,
            quality: self.images.quality.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::parse("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.store.backend, "sqlite");
        assert_eq!(config.store.quota_bytes, Some(5_242_880));
        assert_eq!(config.compress_options(), CompressOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::parse(
            r#"
            [store]
            backend = "memory"

            [images]
            quality = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.store.connection_string, "inspection-report.db");
        assert_eq!(config.images.max_width, 1920);
        assert_eq!(config.compress_options().quality, 0.6);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = AppConfig::parse("[store\nbackend = 1").unwrap_err();

        assert!(format!("{err:#}").contains("Failed to parse TOML"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/inspection.toml"))).is_err());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let mut config = AppConfig::parse(
            r#"
            [store]
            backend = "memory"
            connection_string = "from-file.db"
            "#,
        )
        .unwrap();

        config.apply_env_from(env(&[(ENV_STORE, "sqlite"), (ENV_DB, "from-env.db")]));
        assert_eq!(config.store.backend, "sqlite");
        assert_eq!(config.store.connection_string, "from-env.db");

        config.apply_cli(None, Some("from-cli.db".to_string()));
        assert_eq!(config.store.backend, "sqlite");
        assert_eq!(config.store.connection_string, "from-cli.db");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = AppConfig::default();

        config.apply_env_from(env(&[(ENV_STORE, "")]));

        assert_eq!(config.store.backend, "sqlite");
    }

    #[test]
    fn store_config_carries_quota() {
        let mut config = AppConfig::default();
        config.store.quota_bytes = None;

        let store = config.store_config();

        assert_eq!(store.backend, "sqlite");
        assert_eq!(store.quota_bytes, None);
    }
}

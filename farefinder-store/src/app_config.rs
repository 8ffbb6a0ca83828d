use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use farefinder_core::DEFAULT_TTL_MILLIS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset means the HTTP client's own default.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    pub redis_url: Option<String>,
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            redis_url: None,
            redis_prefix: default_redis_prefix(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".farefinder/storage.json")
}

fn default_redis_prefix() -> String {
    "farefinder:".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_millis")]
    pub ttl_millis: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_millis: default_ttl_millis(),
        }
    }
}

fn default_ttl_millis() -> i64 {
    DEFAULT_TTL_MILLIS
}

impl Config {
    /// Loads `config/default`, `config/{RUN_MODE}`, `config/local`, then
    /// `FAREFINDER__*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Defaults shipped with the repository
            .add_source(config::File::from(dir.join("default")).required(false))
            // Per-environment overrides, optional
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::from(dir.join("local")).required(false))
            // Eg. `FAREFINDER__API__BASE_URL=https://...` sets `api.base_url`
            .add_source(config::Environment::with_prefix("FAREFINDER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

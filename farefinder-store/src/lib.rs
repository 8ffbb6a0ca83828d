pub mod app_config;
pub mod file_store;
pub mod redis_repo;

use std::sync::Arc;

use farefinder_core::{KeyValueStore, MemoryStore};

use crate::app_config::{StorageBackend, StorageConfig};

pub use app_config::Config;
pub use file_store::FileStore;
pub use redis_repo::RedisStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreSetupError {
    #[error("storage.redis_url is required for the redis backend")]
    MissingRedisUrl,
    #[error("Failed to open Redis: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Opens the key/value store selected by `storage.backend`.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, StoreSetupError> {
    Ok(match config.backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.path)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or(StoreSetupError::MissingRedisUrl)?;
            Arc::new(RedisStore::new(url, &config.redis_prefix)?)
        }
    })
}

use async_trait::async_trait;
use farefinder_core::{KeyValueStore, StoreError};
use redis::AsyncCommands;
use tracing::info;

/// Key/value entries in Redis, namespaced by a key prefix. Entries carry no
/// Redis expiry; freshness is decided by the result cache.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    prefix: String,
}

impl RedisStore {
    pub fn new(connection_string: &str, prefix: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Using Redis storage at {}", connection_string);
        Ok(Self {
            client,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

fn backend(err: redis::RedisError) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(backend)?;
        conn.get::<_, Option<String>>(self.key(key)).await.map_err(backend)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(backend)?;
        conn.set::<_, _, ()>(self.key(key), value).await.map_err(backend)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(backend)?;
        conn.del::<_, ()>(self.key(key)).await.map_err(backend)
    }
}

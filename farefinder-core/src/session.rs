use std::sync::Arc;

use tracing::warn;

use crate::store::{KeyValueStore, StoreError};

pub const TOKEN_KEY: &str = "token";

/// Access to the stored bearer credential. The token itself is opaque.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The current token; an unreadable or blank entry counts as logged out.
    pub async fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!("Could not read session token: {}", e);
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    pub async fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, token).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY).await
    }
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use farefinder_core::{
    AccountService, AirportLookup, Clock, FavoritesClient, KeyValueStore, ResultCache, SearchOrchestrator,
    SessionStore, SystemClock,
};
use farefinder_store::{open_store, Config};

use crate::api::ApiClient;

/// Everything a command needs, wired over one API client and one store.
pub struct AppContext {
    pub session: SessionStore,
    pub search: SearchOrchestrator,
    pub favorites: FavoritesClient,
    pub airports: AirportLookup,
    pub account: AccountService,
}

impl AppContext {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api.base_url, config.api.timeout_seconds.map(Duration::from_secs))
            .context("Failed to build HTTP client")?;
        let store = open_store(&config.storage).context("Failed to open storage")?;
        Ok(Self::new(api, store, Arc::new(SystemClock), config.cache.ttl_millis))
    }

    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl_millis: i64) -> Self {
        let api = Arc::new(api);
        let session = SessionStore::new(store.clone());
        let cache = ResultCache::new(store, clock).with_ttl(ttl_millis);
        Self {
            search: SearchOrchestrator::new(api.clone(), cache, session.clone()),
            favorites: FavoritesClient::new(api.clone(), session.clone()),
            airports: AirportLookup::new(api.clone()),
            account: AccountService::new(api, session.clone()),
            session,
        }
    }
}

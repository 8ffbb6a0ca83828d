use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::models::Itinerary;
use crate::search::FlightQuery;
use crate::store::{KeyValueStore, StoreError};

/// 72 hours.
pub const DEFAULT_TTL_MILLIS: i64 = 259_200_000;

/// A normalized result set as persisted: `{ "flights": [...], "timestamp": ms }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(skip)]
    pub key: String,
    #[serde(rename = "flights", default)]
    pub itineraries: Vec<Itinerary>,
    #[serde(rename = "timestamp")]
    pub fetched_at_millis: i64,
}

/// Search results keyed by origin, destination and date.
///
/// Entries are never deleted: an expired entry reads as a miss and is
/// overwritten by the next successful search. There is no locking, so
/// concurrent writers to one key resolve as last-write-wins.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl_millis: DEFAULT_TTL_MILLIS,
        }
    }

    pub fn with_ttl(mut self, ttl_millis: i64) -> Self {
        self.ttl_millis = ttl_millis;
        self
    }

    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock
            .now_millis()
            .checked_sub(entry.fetched_at_millis)
            .is_some_and(|age| age < self.ttl_millis)
    }

    /// The fresh entry for `query`, if any. Unreadable entries count as misses.
    pub async fn get(&self, query: &FlightQuery) -> Option<CacheEntry> {
        let key = query.cache_key();
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        let mut entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                return None;
            }
        };

        if !self.is_fresh(&entry) {
            debug!("Cache entry {} is stale (fetched at {})", key, entry.fetched_at_millis);
            return None;
        }

        entry.key = key;
        Some(entry)
    }

    /// Stores `itineraries` under `query`'s key, stamped with the current time.
    pub async fn put(&self, query: &FlightQuery, itineraries: &[Itinerary]) -> Result<CacheEntry, StoreError> {
        let entry = CacheEntry {
            key: query.cache_key(),
            itineraries: itineraries.to_vec(),
            fetched_at_millis: self.clock.now_millis(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&entry.key, &raw).await?;
        debug!("Cached {} flights under {}", entry.itineraries.len(), entry.key);
        Ok(entry)
    }
}

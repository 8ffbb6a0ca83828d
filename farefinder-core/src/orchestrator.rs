use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::gateway::{FlightSearchGateway, GatewayError};
use crate::models::Itinerary;
use crate::normalizer::Normalizer;
use crate::search::{FlightQuery, SearchPayload};
use crate::session::SessionStore;

pub const GENERIC_SEARCH_FAILURE: &str = "Failed to fetch flights";

/// A failed search, carrying the message to show the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SearchError {
    pub message: String,
}

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<GatewayError> for SearchError {
    fn from(err: GatewayError) -> Self {
        match err.server_message() {
            Some(message) => Self::new(message),
            None => {
                warn!("Flight search failed: {}", err);
                Self::new(GENERIC_SEARCH_FAILURE)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub itineraries: Vec<Itinerary>,
    pub from_cache: bool,
}

/// What a results view renders: on failure, an empty list plus the message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub itineraries: Vec<Itinerary>,
    pub error: Option<String>,
    pub from_cache: bool,
}

/// Cache-first flight search.
///
/// Concurrent searches for one key are not coalesced and a late response is
/// not suppressed; whichever finishes last owns the cache entry.
pub struct SearchOrchestrator {
    gateway: Arc<dyn FlightSearchGateway>,
    cache: ResultCache,
    session: SessionStore,
}

impl SearchOrchestrator {
    pub fn new(gateway: Arc<dyn FlightSearchGateway>, cache: ResultCache, session: SessionStore) -> Self {
        Self { gateway, cache, session }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub async fn search(&self, query: &FlightQuery) -> Result<SearchOutcome, SearchError> {
        // 1. Fresh cache entry: no network call
        if let Some(entry) = self.cache.get(query).await {
            debug!("Loaded {} flights from cache: {}", entry.itineraries.len(), entry.key);
            return Ok(SearchOutcome {
                itineraries: entry.itineraries,
                from_cache: true,
            });
        }

        // 2. Remote search, forwarding the bearer token when logged in
        info!("Fetching flights from API: {}", query.cache_key());
        let token = self.session.token().await;
        let body = self.gateway.search_offers(&query.to_request(), token.as_deref()).await?;

        // 3. Normalize whatever shape came back
        let payload = SearchPayload::from_json(body);
        let offered = payload.offers.len();
        let itineraries = Normalizer::new(payload.carriers).normalize_all(&payload.offers);
        info!(
            "Normalized {} of {} offers for {}",
            itineraries.len(),
            offered,
            query.cache_key()
        );

        // 4. Best-effort cache write
        if let Err(e) = self.cache.put(query, &itineraries).await {
            warn!("Could not cache flights for {}: {}", query.cache_key(), e);
        }

        Ok(SearchOutcome {
            itineraries,
            from_cache: false,
        })
    }

    pub async fn search_snapshot(&self, query: &FlightQuery) -> SearchSnapshot {
        match self.search(query).await {
            Ok(outcome) => SearchSnapshot {
                itineraries: outcome.itineraries,
                error: None,
                from_cache: outcome.from_cache,
            },
            Err(e) => SearchSnapshot {
                itineraries: Vec::new(),
                error: Some(e.message),
                from_cache: false,
            },
        }
    }
}

use std::sync::Arc;

use tracing::warn;

use crate::gateway::AirportGateway;
use crate::models::Airport;

/// Most suggestions a lookup returns.
pub const MAX_SUGGESTIONS: usize = 10;

/// Airport autocomplete. Never fails: lookups are advisory.
pub struct AirportLookup {
    gateway: Arc<dyn AirportGateway>,
}

impl AirportLookup {
    pub fn new(gateway: Arc<dyn AirportGateway>) -> Self {
        Self { gateway }
    }

    pub async fn search(&self, query: &str) -> Vec<Airport> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.gateway.search_airports(query).await {
            Ok(mut airports) => {
                airports.truncate(MAX_SUGGESTIONS);
                airports
            }
            Err(e) => {
                warn!("Airport lookup for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

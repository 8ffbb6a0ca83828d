use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Airport, Itinerary, RecentSearch, SavedFlight};
use crate::search::OfferSearchRequest;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Non-2xx response; `message` is the body's `message` field when present.
    #[error(
        "Upstream returned status {status}{}",
        .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
    )]
    Status { status: u16, message: Option<String> },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// The server-provided message, if the server sent a non-empty one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Status { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}

/// Upstream flight search.
#[async_trait]
pub trait FlightSearchGateway: Send + Sync {
    /// Returns the response body as-is; shape handling is the caller's job.
    async fn search_offers(&self, request: &OfferSearchRequest, token: Option<&str>) -> Result<Value, GatewayError>;
}

/// Airport autocomplete endpoint.
#[async_trait]
pub trait AirportGateway: Send + Sync {
    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>, GatewayError>;
}

/// Saved flights of the authenticated account.
#[async_trait]
pub trait SavedFlightsGateway: Send + Sync {
    async fn save_flight(&self, token: &str, flight: &Itinerary) -> Result<(), GatewayError>;

    async fn list_saved_flights(&self, token: &str) -> Result<Vec<SavedFlight>, GatewayError>;

    async fn delete_saved_flight(&self, token: &str, id: &str) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, GatewayError>;

    async fn recent_searches(&self, token: &str) -> Result<Vec<RecentSearch>, GatewayError>;
}

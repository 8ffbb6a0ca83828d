pub mod account;
pub mod airports;
pub mod cache;
pub mod clock;
pub mod duration;
pub mod favorites;
pub mod gateway;
pub mod identity;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod search;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use account::{AccountError, AccountService};
pub use airports::AirportLookup;
pub use cache::{CacheEntry, ResultCache, DEFAULT_TTL_MILLIS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use favorites::{FavoritePatch, FavoritesClient, FavoritesError};
pub use gateway::{AccountGateway, AirportGateway, FlightSearchGateway, GatewayError, SavedFlightsGateway};
pub use identity::identity_hash;
pub use models::{Airport, Itinerary, RecentSearch, SavedFlight, Segment};
pub use normalizer::{NormalizationSkip, Normalizer};
pub use orchestrator::{SearchError, SearchOrchestrator, SearchOutcome, SearchSnapshot};
pub use search::{FlightQuery, OfferSearchRequest, SearchPayload};
pub use session::SessionStore;
pub use store::{KeyValueStore, MemoryStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

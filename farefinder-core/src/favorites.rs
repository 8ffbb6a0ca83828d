use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::gateway::{GatewayError, SavedFlightsGateway};
use crate::models::{Itinerary, SavedFlight};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FavoritesError {
    #[error("You must be logged in to save flights.")]
    AuthRequired,
    #[error("Failed to save flight: {0}")]
    SaveFailed(GatewayError),
    #[error("Failed to delete flight: {0}")]
    DeleteFailed(GatewayError),
    #[error("Failed to get saved flights: {0}")]
    ListFailed(GatewayError),
}

/// A local favorite flip that has not been confirmed remotely yet.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoritePatch {
    /// Identity hash of the itinerary's segments.
    pub identity: String,
    pub previous: bool,
    pub favorited: bool,
    /// The itinerary re-keyed by `identity`, as the account service stores it.
    pub itinerary: Itinerary,
}

/// Optimistic favorites backed by the account's saved flights.
///
/// The local mirror is keyed by identity hash, so the same physical
/// itinerary seen in two searches (with two different offer ids) shares one
/// flag and one saved record.
pub struct FavoritesClient {
    gateway: Arc<dyn SavedFlightsGateway>,
    session: SessionStore,
    favorited: RwLock<HashMap<String, bool>>,
}

impl FavoritesClient {
    pub fn new(gateway: Arc<dyn SavedFlightsGateway>, session: SessionStore) -> Self {
        Self {
            gateway,
            session,
            favorited: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_favorited(&self, itinerary: &Itinerary) -> bool {
        self.flag(&itinerary.identity_hash())
    }

    fn flag(&self, identity: &str) -> bool {
        let favorited = self.favorited.read().unwrap_or_else(PoisonError::into_inner);
        favorited.get(identity).copied().unwrap_or(false)
    }

    fn set_flag(&self, identity: &str, value: bool) {
        let mut favorited = self.favorited.write().unwrap_or_else(PoisonError::into_inner);
        favorited.insert(identity.to_string(), value);
    }

    /// Phase one: flip the local flag now and return the patch describing it.
    pub fn apply_local(&self, itinerary: &Itinerary) -> FavoritePatch {
        let keyed = itinerary.keyed_by_identity();
        let identity = keyed.id().to_string();

        let mut favorited = self.favorited.write().unwrap_or_else(PoisonError::into_inner);
        let previous = favorited.get(&identity).copied().unwrap_or(false);
        favorited.insert(identity.clone(), !previous);

        FavoritePatch {
            identity,
            previous,
            favorited: !previous,
            itinerary: keyed,
        }
    }

    /// Phase two: save or delete remotely according to the patch.
    pub async fn confirm_remote(&self, patch: &FavoritePatch) -> Result<(), FavoritesError> {
        let token = self.require_token().await?;
        self.send(&token, patch).await
    }

    /// Undoes a patch whose remote confirmation failed.
    pub fn revert(&self, patch: &FavoritePatch) {
        self.set_flag(&patch.identity, patch.previous);
    }

    /// Flips the favorite and confirms it remotely, returning the new state.
    ///
    /// Fails with `AuthRequired` before touching local state when logged
    /// out. A failed remote call reverts the local flag and is returned.
    pub async fn toggle_favorite(&self, itinerary: &Itinerary) -> Result<bool, FavoritesError> {
        let token = self.require_token().await?;
        let patch = self.apply_local(itinerary);
        match self.send(&token, &patch).await {
            Ok(()) => Ok(patch.favorited),
            Err(e) => {
                warn!("Reverting favorite {}: {}", patch.identity, e);
                self.revert(&patch);
                Err(e)
            }
        }
    }

    /// Fetches the account's saved flights and marks each as favorited.
    pub async fn saved_flights(&self) -> Result<Vec<SavedFlight>, FavoritesError> {
        let token = self.require_token().await?;
        let saved = self
            .gateway
            .list_saved_flights(&token)
            .await
            .map_err(FavoritesError::ListFailed)?;
        for flight in &saved {
            self.set_flag(flight.itinerary.id(), true);
        }
        Ok(saved)
    }

    /// Deletes a saved flight by its stored id.
    pub async fn remove_saved(&self, id: &str) -> Result<(), FavoritesError> {
        let token = self.require_token().await?;
        self.gateway
            .delete_saved_flight(&token, id)
            .await
            .map_err(FavoritesError::DeleteFailed)?;
        self.set_flag(id, false);
        Ok(())
    }

    async fn require_token(&self) -> Result<String, FavoritesError> {
        self.session.token().await.ok_or(FavoritesError::AuthRequired)
    }

    async fn send(&self, token: &str, patch: &FavoritePatch) -> Result<(), FavoritesError> {
        if patch.favorited {
            self.gateway
                .save_flight(token, &patch.itinerary)
                .await
                .map_err(FavoritesError::SaveFailed)?;
            info!("Saved flight {}", patch.identity);
        } else {
            self.gateway
                .delete_saved_flight(token, &patch.identity)
                .await
                .map_err(FavoritesError::DeleteFailed)?;
            info!("Deleted saved flight {}", patch.identity);
        }
        Ok(())
    }
}

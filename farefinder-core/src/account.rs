use std::sync::Arc;

use tracing::info;

use crate::gateway::{AccountGateway, GatewayError};
use crate::models::RecentSearch;
use crate::session::SessionStore;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Login failed: {0}")]
    LoginFailed(GatewayError),
    #[error("Failed to get recent searches: {0}")]
    RecentSearchesFailed(GatewayError),
    #[error("Could not store session: {0}")]
    Storage(#[from] StoreError),
}

/// Login/logout and account queries that are not favorites.
pub struct AccountService {
    gateway: Arc<dyn AccountGateway>,
    session: SessionStore,
}

impl AccountService {
    pub fn new(gateway: Arc<dyn AccountGateway>, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    /// Exchanges credentials for a token and stores it for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AccountError> {
        let token = self
            .gateway
            .login(email, password)
            .await
            .map_err(AccountError::LoginFailed)?;
        if token.trim().is_empty() {
            return Err(AccountError::LoginFailed(GatewayError::Decode(
                "login response carried an empty token".to_string(),
            )));
        }
        self.session.set_token(&token).await?;
        info!("Logged in as {}", email);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), AccountError> {
        self.session.clear().await?;
        Ok(())
    }

    /// Recent searches of the logged-in user; logged out means none.
    pub async fn recent_searches(&self) -> Result<Vec<RecentSearch>, AccountError> {
        let Some(token) = self.session.token().await else {
            return Ok(Vec::new());
        };
        self.gateway
            .recent_searches(&token)
            .await
            .map_err(AccountError::RecentSearchesFailed)
    }
}

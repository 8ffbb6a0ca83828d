use std::time::Duration;

use async_trait::async_trait;
use farefinder_core::{
    AccountGateway, Airport, AirportGateway, FlightSearchGateway, GatewayError, Itinerary, OfferSearchRequest,
    RecentSearch, SavedFlight, SavedFlightsGateway,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{expect_success, read_json, transport};

/// HTTP client for the flight backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

impl ApiClient {
    /// `timeout` of `None` keeps reqwest's default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(token: &str) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| GatewayError::Transport(format!("invalid auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn saved_flight_url(&self, id: &str) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.url("/api/user/saved-flights"))
            .map_err(|e| GatewayError::Transport(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport("base url cannot carry a path".to_string()))?
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl FlightSearchGateway for ApiClient {
    async fn search_offers(&self, request: &OfferSearchRequest, token: Option<&str>) -> Result<Value, GatewayError> {
        let headers = match token {
            Some(token) => Self::bearer(token)?,
            None => HeaderMap::new(),
        };
        let response = self
            .http
            .post(self.url("/api/flights"))
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }
}

#[async_trait]
impl AirportGateway for ApiClient {
    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>, GatewayError> {
        let response = self
            .http
            .get(self.url("/api/airports/search"))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(transport)?;
        // The endpoint answers `null` when nothing matches.
        let airports: Option<Vec<Airport>> = read_json(response).await?;
        Ok(airports.unwrap_or_default())
    }
}

#[async_trait]
impl SavedFlightsGateway for ApiClient {
    async fn save_flight(&self, token: &str, flight: &Itinerary) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(self.url("/api/user/saved-flights"))
            .headers(Self::bearer(token)?)
            .json(flight)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response).await
    }

    async fn list_saved_flights(&self, token: &str) -> Result<Vec<SavedFlight>, GatewayError> {
        let response = self
            .http
            .get(self.url("/api/user/saved-flights"))
            .headers(Self::bearer(token)?)
            .send()
            .await
            .map_err(transport)?;
        let records: Option<Vec<Value>> = read_json(response).await?;
        Ok(SavedFlight::from_records(records.unwrap_or_default()))
    }

    async fn delete_saved_flight(&self, token: &str, id: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(self.saved_flight_url(id)?)
            .headers(Self::bearer(token)?)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response).await
    }
}

#[async_trait]
impl AccountGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(transport)?;
        let body: LoginResponse = read_json(response).await?;
        Ok(body.token)
    }

    async fn recent_searches(&self, token: &str) -> Result<Vec<RecentSearch>, GatewayError> {
        let response = self
            .http
            .get(self.url("/api/user/recent-searches"))
            .headers(Self::bearer(token)?)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/flights"), "http://localhost:5000/api/flights");
    }

    #[test]
    fn test_saved_flight_url_escapes_id() {
        let client = ApiClient::new("http://localhost:5000", None).unwrap();
        assert_eq!(
            client.saved_flight_url("abc123").unwrap().as_str(),
            "http://localhost:5000/api/user/saved-flights/abc123"
        );
        assert_eq!(
            client.saved_flight_url("a/b").unwrap().as_str(),
            "http://localhost:5000/api/user/saved-flights/a%2Fb"
        );
    }
}

//! Scripted upstream used by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::gateway::{AccountGateway, AirportGateway, FlightSearchGateway, GatewayError, SavedFlightsGateway};
use crate::models::{Airport, Itinerary, RecentSearch, SavedFlight};
use crate::search::OfferSearchRequest;

#[derive(Default)]
pub(crate) struct FakeUpstream {
    pub search_response: Mutex<Option<Result<Value, GatewayError>>>,
    pub search_calls: AtomicUsize,
    pub last_search: Mutex<Option<(OfferSearchRequest, Option<String>)>>,
    pub airports: Mutex<Option<Result<Vec<Airport>, GatewayError>>>,
    pub airport_calls: AtomicUsize,
    pub saved: Mutex<Vec<Itinerary>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_account_calls: Mutex<Option<GatewayError>>,
    pub account_calls: AtomicUsize,
    pub recent: Mutex<Vec<RecentSearch>>,
}

impl FakeUpstream {
    pub fn respond_with(&self, response: Result<Value, GatewayError>) {
        *self.search_response.lock().unwrap() = Some(response);
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    fn account_call(&self) -> Result<(), GatewayError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_account_calls.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FlightSearchGateway for FakeUpstream {
    async fn search_offers(&self, request: &OfferSearchRequest, token: Option<&str>) -> Result<Value, GatewayError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some((request.clone(), token.map(str::to_string)));
        self.search_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(json!([])))
    }
}

#[async_trait]
impl AirportGateway for FakeUpstream {
    async fn search_airports(&self, _query: &str) -> Result<Vec<Airport>, GatewayError> {
        self.airport_calls.fetch_add(1, Ordering::SeqCst);
        self.airports.lock().unwrap().clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl SavedFlightsGateway for FakeUpstream {
    async fn save_flight(&self, _token: &str, flight: &Itinerary) -> Result<(), GatewayError> {
        self.account_call()?;
        self.saved.lock().unwrap().push(flight.clone());
        Ok(())
    }

    async fn list_saved_flights(&self, _token: &str) -> Result<Vec<SavedFlight>, GatewayError> {
        self.account_call()?;
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .map(|itinerary| SavedFlight {
                itinerary: itinerary.clone(),
                saved_at_millis: 1,
            })
            .collect())
    }

    async fn delete_saved_flight(&self, _token: &str, id: &str) -> Result<(), GatewayError> {
        self.account_call()?;
        self.deleted.lock().unwrap().push(id.to_string());
        self.saved.lock().unwrap().retain(|i| i.id() != id);
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for FakeUpstream {
    async fn login(&self, email: &str, password: &str) -> Result<String, GatewayError> {
        self.account_call()?;
        if password == "correct horse" {
            Ok(format!("token-for-{}", email))
        } else {
            Err(GatewayError::Status { status: 401, message: None })
        }
    }

    async fn recent_searches(&self, _token: &str) -> Result<Vec<RecentSearch>, GatewayError> {
        self.account_call()?;
        Ok(self.recent.lock().unwrap().clone())
    }
}

/// Scenario A upstream body: one offer, two segments, `AA` in the dictionary.
pub(crate) fn jfk_lax_response() -> Value {
    json!({
        "data": [{
            "id": "1",
            "itineraries": [{
                "duration": "PT8H30M",
                "segments": [
                    {
                        "carrierCode": "AA", "number": "100",
                        "departure": { "iataCode": "JFK", "at": "2025-08-21T08:00:00" },
                        "arrival": { "iataCode": "ORD", "at": "2025-08-21T10:00:00" },
                        "duration": "PT3H"
                    },
                    {
                        "carrierCode": "AA", "number": "200",
                        "departure": { "iataCode": "ORD", "at": "2025-08-21T12:00:00" },
                        "arrival": { "iataCode": "LAX", "at": "2025-08-21T14:30:00" },
                        "duration": "PT4H30M"
                    }
                ]
            }],
            "price": { "grandTotal": "345.50", "currency": "USD" },
            "validatingAirlineCodes": ["AA"]
        }],
        "dictionaries": { "carriers": { "AA": "American Airlines" } }
    })
}

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CoreError, CoreResult};

/// A validated origin/destination/date search.
///
/// Airport codes are 3 or 4 ASCII letters (IATA or ICAO), upper-cased, so the
/// `-` used to join cache keys can never occur inside a key part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightQuery {
    origin: String,
    destination: String,
    date: NaiveDate,
}

impl FlightQuery {
    pub fn new(origin: &str, destination: &str, date: NaiveDate) -> CoreResult<Self> {
        Ok(Self {
            origin: airport_code(origin, "origin")?,
            destination: airport_code(destination, "destination")?,
            date,
        })
    }

    /// Same as [`FlightQuery::new`] with the date given as `YYYY-MM-DD`.
    pub fn parse(origin: &str, destination: &str, date: &str) -> CoreResult<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            CoreError::ValidationError(format!("date must be YYYY-MM-DD, got {:?}: {}", date, e))
        })?;
        Self::new(origin, destination, date)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `{origin}-{destination}-{date}`, the key persisted results live under.
    pub fn cache_key(&self) -> String {
        format!("{}-{}-{}", self.origin, self.destination, self.date_string())
    }

    pub fn to_request(&self) -> OfferSearchRequest {
        OfferSearchRequest {
            origin_location_code: self.origin.clone(),
            destination_location_code: self.destination.clone(),
            departure_date_time_range: DepartureDateTimeRange {
                date: self.date_string(),
            },
        }
    }
}

fn airport_code(raw: &str, field: &str) -> CoreResult<String> {
    let code = raw.trim();
    if !(3..=4).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::ValidationError(format!(
            "{} must be a 3 or 4 letter airport code, got {:?}",
            field, raw
        )));
    }
    Ok(code.to_ascii_uppercase())
}

/// Body of `POST /api/flights`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSearchRequest {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date_time_range: DepartureDateTimeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureDateTimeRange {
    pub date: String,
}

pub type CarrierDictionary = HashMap<String, String>;

/// A flight-search response reduced to its offers and carrier names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPayload {
    pub offers: Vec<Value>,
    pub carriers: CarrierDictionary,
}

impl SearchPayload {
    /// Accepts a bare array of offers or an object with a `data` array and
    /// optional `dictionaries.carriers`. Any other shape yields no offers.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(offers) => Self {
                offers,
                carriers: CarrierDictionary::new(),
            },
            Value::Object(mut body) => {
                let carriers = body
                    .get("dictionaries")
                    .and_then(|d| d.get("carriers"))
                    .map(carrier_dictionary)
                    .unwrap_or_default();
                match body.remove("data") {
                    Some(Value::Array(offers)) => Self { offers, carriers },
                    _ => {
                        tracing::warn!("Unexpected flights payload shape, returning empty list");
                        Self::default()
                    }
                }
            }
            _ => {
                tracing::warn!("Unexpected flights payload shape, returning empty list");
                Self::default()
            }
        }
    }
}

/// Reads a `{ code: name }` object, ignoring entries whose name is not a string.
pub(crate) fn carrier_dictionary(value: &Value) -> CarrierDictionary {
    value
        .as_object()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(code, name)| name.as_str().map(|n| (code.clone(), n.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::duration::{format_iso_duration, total_duration};
use crate::models::{Itinerary, Segment};
use crate::search::{carrier_dictionary, CarrierDictionary};

// ============================================================================
// Raw provider records
// ============================================================================
//
// Every field is optional: providers omit, null out, or retype fields, and a
// single odd offer must not make the whole response unreadable.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOffer {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub itineraries: Option<Vec<RawItinerary>>,
    #[serde(deserialize_with = "lenient")]
    pub price: Option<RawPrice>,
    #[serde(deserialize_with = "lenient")]
    pub validating_airline_codes: Option<Vec<Option<String>>>,
    #[serde(deserialize_with = "lenient")]
    pub dictionaries: Option<RawDictionaries>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawItinerary {
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub segments: Option<Vec<RawSegment>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSegment {
    #[serde(deserialize_with = "lenient")]
    pub carrier_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub departure: Option<RawEndpoint>,
    #[serde(deserialize_with = "lenient")]
    pub arrival: Option<RawEndpoint>,
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEndpoint {
    #[serde(deserialize_with = "lenient")]
    pub iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPrice {
    pub grand_total: Option<Value>,
    pub total: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDictionaries {
    #[serde(deserialize_with = "lenient_carriers")]
    pub carriers: CarrierDictionary,
}

/// A field of the wrong shape reads as absent instead of failing the offer.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

/// Strings stay strings, numbers are rendered, everything else is absent.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_carriers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CarrierDictionary, D::Error> {
    Ok(carrier_dictionary(&Value::deserialize(deserializer)?))
}

// ============================================================================
// Normalizer
// ============================================================================

/// Why an offer was left out of a normalized result set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationSkip {
    #[error("offer is not an object: {0}")]
    Malformed(String),
    #[error("offer has no itineraries")]
    NoItinerary,
    #[error("first itinerary has no segments")]
    NoSegments,
}

/// Placeholder airline name when an offer names no validating carrier.
pub const UNKNOWN_AIRLINE: &str = "NA";

/// Reduces provider offers to canonical itineraries.
///
/// Carrier display names come from the response-level dictionary, overridden
/// per offer by an offer-level `dictionaries.carriers` when one is present.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    carriers: CarrierDictionary,
}

impl Normalizer {
    pub fn new(carriers: CarrierDictionary) -> Self {
        Self { carriers }
    }

    /// Normalizes every offer, keeping input order and dropping the ones that
    /// cannot be normalized.
    pub fn normalize_all(&self, offers: &[Value]) -> Vec<Itinerary> {
        offers.iter().filter_map(|offer| self.normalize(offer)).collect()
    }

    pub fn normalize(&self, offer: &Value) -> Option<Itinerary> {
        self.try_normalize(offer)
            .map_err(|reason| {
                warn!("Skipping flight offer {}: {}", offer_label(offer), reason);
            })
            .ok()
    }

    pub fn try_normalize(&self, offer: &Value) -> Result<Itinerary, NormalizationSkip> {
        let raw = RawOffer::deserialize(offer).map_err(|e| NormalizationSkip::Malformed(e.to_string()))?;
        self.normalize_offer(&raw)
    }

    pub fn normalize_offer(&self, offer: &RawOffer) -> Result<Itinerary, NormalizationSkip> {
        let itinerary = offer
            .itineraries
            .as_ref()
            .and_then(|itineraries| itineraries.first())
            .ok_or(NormalizationSkip::NoItinerary)?;

        let local = offer.dictionaries.as_ref().map(|d| &d.carriers);

        let segments: Vec<Segment> = itinerary
            .segments
            .iter()
            .flatten()
            .map(|segment| self.segment(segment, local))
            .collect();
        if segments.is_empty() {
            return Err(NormalizationSkip::NoSegments);
        }

        let airline = offer
            .validating_airline_codes
            .as_ref()
            .and_then(|codes| codes.first())
            .and_then(|code| code.as_deref())
            .filter(|code| !code.is_empty())
            .map(|code| self.carrier_name(code, local))
            .unwrap_or_else(|| UNKNOWN_AIRLINE.to_string());

        let total_duration_iso = itinerary
            .duration
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| {
                total_duration(segments.iter().map(|s| s.duration_iso.as_str())).map(format_iso_duration)
            })
            .unwrap_or_default();

        let id = offer
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Itinerary::new(id, airline, parse_price(offer.price.as_ref()), total_duration_iso, segments)
            .ok_or(NormalizationSkip::NoSegments)
    }

    fn segment(&self, raw: &RawSegment, local: Option<&CarrierDictionary>) -> Segment {
        let carrier_code = raw.carrier_code.clone().unwrap_or_default();
        let departure = raw.departure.as_ref();
        let arrival = raw.arrival.as_ref();
        Segment {
            carrier_name: self.carrier_name(&carrier_code, local),
            carrier_code,
            flight_number: raw.number.clone().unwrap_or_default(),
            departure_airport: departure.and_then(|e| e.iata_code.clone()).unwrap_or_default(),
            departure_at: departure.and_then(|e| e.at.clone()).unwrap_or_default(),
            arrival_airport: arrival.and_then(|e| e.iata_code.clone()).unwrap_or_default(),
            arrival_at: arrival.and_then(|e| e.at.clone()).unwrap_or_default(),
            duration_iso: raw.duration.clone().unwrap_or_default(),
        }
    }

    fn carrier_name(&self, code: &str, local: Option<&CarrierDictionary>) -> String {
        local
            .and_then(|carriers| carriers.get(code))
            .or_else(|| self.carriers.get(code))
            .filter(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }
}

/// `price.grandTotal`, else `price.total`. Total function: anything missing,
/// non-numeric, non-finite or negative ends up as 0.
pub fn parse_price(price: Option<&RawPrice>) -> f64 {
    price
        .and_then(|p| {
            p.grand_total
                .as_ref()
                .and_then(amount)
                .or_else(|| p.total.as_ref().and_then(amount))
        })
        .unwrap_or(0.0)
}

fn amount(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed.abs())
}

fn offer_label(offer: &Value) -> String {
    match offer.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => "<no id>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_segment(code: &str, number: &str, from: &str, dep: &str, to: &str, arr: &str, duration: &str) -> Value {
        json!({
            "carrierCode": code,
            "number": number,
            "departure": { "iataCode": from, "at": dep },
            "arrival": { "iataCode": to, "at": arr },
            "duration": duration
        })
    }

    fn two_segment_offer() -> Value {
        json!({
            "id": "1",
            "itineraries": [{
                "duration": "PT8H",
                "segments": [
                    raw_segment("AA", "100", "JFK", "2025-08-21T08:00:00", "ORD", "2025-08-21T10:00:00", "PT3H"),
                    raw_segment("AA", "200", "ORD", "2025-08-21T12:00:00", "LAX", "2025-08-21T14:30:00", "PT4H30M")
                ]
            }],
            "price": { "grandTotal": "345.50", "total": "300.00" },
            "validatingAirlineCodes": ["AA"]
        })
    }

    fn carriers() -> CarrierDictionary {
        CarrierDictionary::from([("AA".to_string(), "American Airlines".to_string())])
    }

    #[test]
    fn test_normalize_two_segment_offer() {
        let itinerary = Normalizer::new(carriers()).normalize(&two_segment_offer()).unwrap();

        assert_eq!(itinerary.id(), "1");
        assert_eq!(itinerary.airline_display_name(), "American Airlines");
        assert_eq!(itinerary.price(), 345.5);
        assert_eq!(itinerary.total_duration_iso(), "PT8H");
        assert_eq!(itinerary.segments().len(), 2);
        assert_eq!(itinerary.origin_airport(), "JFK");
        assert_eq!(itinerary.departure_at(), "2025-08-21T08:00:00");
        assert_eq!(itinerary.destination_airport(), "LAX");
        assert_eq!(itinerary.arrival_at(), "2025-08-21T14:30:00");
        assert_eq!(itinerary.segments()[1].carrier_name, "American Airlines");
        assert_eq!(itinerary.segments()[1].duration_iso, "PT4H30M");
    }

    #[test]
    fn test_carrier_falls_back_to_code_then_placeholder() {
        let offer = two_segment_offer();
        let itinerary = Normalizer::default().normalize(&offer).unwrap();
        assert_eq!(itinerary.airline_display_name(), "AA");
        assert_eq!(itinerary.segments()[0].carrier_name, "AA");

        let mut no_codes = two_segment_offer();
        no_codes["validatingAirlineCodes"] = json!([]);
        assert_eq!(Normalizer::default().normalize(&no_codes).unwrap().airline_display_name(), "NA");

        no_codes.as_object_mut().unwrap().remove("validatingAirlineCodes");
        assert_eq!(Normalizer::default().normalize(&no_codes).unwrap().airline_display_name(), "NA");
    }

    #[test]
    fn test_offer_level_dictionary_wins() {
        let mut offer = two_segment_offer();
        offer["dictionaries"] = json!({ "carriers": { "AA": "American" } });
        let itinerary = Normalizer::new(carriers()).normalize(&offer).unwrap();
        assert_eq!(itinerary.airline_display_name(), "American");
    }

    #[test]
    fn test_price_fallbacks_are_total() {
        let cases = [
            (json!({ "grandTotal": "12.25" }), 12.25),
            (json!({ "total": "99" }), 99.0),
            (json!({ "grandTotal": "abc", "total": "40.5" }), 40.5),
            (json!({ "grandTotal": 17.5 }), 17.5),
            (json!({ "grandTotal": "NaN" }), 0.0),
            (json!({ "grandTotal": "inf" }), 0.0),
            (json!({ "grandTotal": "-20" }), 0.0),
            (json!({ "grandTotal": "-0" }), 0.0),
            (json!({ "grandTotal": null }), 0.0),
            (json!({}), 0.0),
            (json!("free"), 0.0),
            (json!("345.50"), 0.0),
            (json!(345.5), 0.0),
            (json!(["12.00"]), 0.0),
        ];
        for (price, expected) in cases {
            let mut offer = two_segment_offer();
            offer["price"] = price.clone();
            let parsed = Normalizer::default().normalize(&offer).map(|i| i.price()).unwrap();
            assert_eq!(parsed, expected, "{price}");
            assert!(parsed.is_sign_positive());
        }

        let mut no_price = two_segment_offer();
        no_price.as_object_mut().unwrap().remove("price");
        assert_eq!(Normalizer::default().normalize(&no_price).unwrap().price(), 0.0);
    }

    #[test]
    fn test_off_shape_fields_keep_the_offer() {
        let mut offer = two_segment_offer();
        offer["validatingAirlineCodes"] = json!("AA");
        offer["dictionaries"] = json!("none");
        offer["itineraries"][0]["duration"] = json!(510);
        offer["itineraries"][0]["segments"][1]["departure"] = json!("ORD");

        let itinerary = Normalizer::new(carriers()).normalize(&offer).unwrap();

        assert_eq!(itinerary.airline_display_name(), UNKNOWN_AIRLINE);
        assert_eq!(itinerary.price(), 345.5);
        assert_eq!(itinerary.total_duration_iso(), "PT7H30M");
        assert_eq!(itinerary.segments().len(), 2);
        assert_eq!(itinerary.segments()[1].departure_airport, "");
        assert_eq!(itinerary.destination_airport(), "LAX");
    }

    #[test]
    fn test_skips_offers_without_itinerary_or_segments() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.try_normalize(&json!({ "id": "a", "itineraries": [] })),
            Err(NormalizationSkip::NoItinerary)
        );
        assert_eq!(normalizer.try_normalize(&json!({ "id": "a" })), Err(NormalizationSkip::NoItinerary));
        assert_eq!(
            normalizer.try_normalize(&json!({ "id": "a", "itineraries": [{ "segments": [] }] })),
            Err(NormalizationSkip::NoSegments)
        );
        assert!(matches!(normalizer.try_normalize(&json!(42)), Err(NormalizationSkip::Malformed(_))));
    }

    #[test]
    fn test_batch_drops_bad_offers_and_keeps_order() {
        let mut second = two_segment_offer();
        second["id"] = json!(2);
        let offers = vec![
            two_segment_offer(),
            json!({ "id": "broken", "itineraries": [] }),
            json!(null),
            second,
        ];
        let itineraries = Normalizer::new(carriers()).normalize_all(&offers);
        let ids: Vec<&str> = itineraries.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_missing_id_and_duration_are_derived() {
        let mut offer = two_segment_offer();
        let body = offer.as_object_mut().unwrap();
        body.remove("id");
        body["itineraries"][0].as_object_mut().unwrap().remove("duration");

        let itinerary = Normalizer::default().normalize(&offer).unwrap();
        assert!(Uuid::parse_str(itinerary.id()).is_ok());
        assert_eq!(itinerary.total_duration_iso(), "PT7H30M");
    }

    #[test]
    fn test_numeric_flight_number_is_rendered() {
        let mut offer = two_segment_offer();
        offer["itineraries"][0]["segments"][0]["number"] = json!(1234);
        let itinerary = Normalizer::default().normalize(&offer).unwrap();
        assert_eq!(itinerary.segments()[0].flight_number, "1234");
    }
}

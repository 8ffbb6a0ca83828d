use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

// ============================================================================
// Segment
// ============================================================================

/// One physical flight leg within an itinerary.
///
/// On the wire a segment keeps the provider's nested shape
/// (`departure: { iataCode, at }`), which is also what cached entries and
/// saved flights contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SegmentWire", into = "SegmentWire")]
pub struct Segment {
    pub carrier_code: String,
    /// Display name resolved from the carrier dictionary, else the code.
    pub carrier_name: String,
    pub flight_number: String,
    pub departure_airport: String,
    pub departure_at: String,
    pub arrival_airport: String,
    pub arrival_at: String,
    pub duration_iso: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentWire {
    #[serde(default)]
    carrier_code: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    departure: EndpointWire,
    #[serde(default)]
    arrival: EndpointWire,
    #[serde(default)]
    duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    carrier_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointWire {
    #[serde(default)]
    iata_code: String,
    #[serde(default)]
    at: String,
}

impl From<SegmentWire> for Segment {
    fn from(wire: SegmentWire) -> Self {
        let carrier_name = wire
            .carrier_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| wire.carrier_code.clone());
        Self {
            carrier_code: wire.carrier_code,
            carrier_name,
            flight_number: wire.number,
            departure_airport: wire.departure.iata_code,
            departure_at: wire.departure.at,
            arrival_airport: wire.arrival.iata_code,
            arrival_at: wire.arrival.at,
            duration_iso: wire.duration,
        }
    }
}

impl From<Segment> for SegmentWire {
    fn from(segment: Segment) -> Self {
        Self {
            carrier_code: segment.carrier_code,
            number: segment.flight_number,
            departure: EndpointWire {
                iata_code: segment.departure_airport,
                at: segment.departure_at,
            },
            arrival: EndpointWire {
                iata_code: segment.arrival_airport,
                at: segment.arrival_at,
            },
            duration: segment.duration_iso,
            carrier_name: Some(segment.carrier_name),
        }
    }
}

// ============================================================================
// Itinerary
// ============================================================================

/// One complete journey with a single price.
///
/// Fields are read through accessors so that the endpoint fields can never
/// drift from the segment list: they are always derived from the first and
/// last segment, and the segment list is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItineraryWire", into = "ItineraryWire")]
pub struct Itinerary {
    pub(crate) id: String,
    pub(crate) airline_display_name: String,
    pub(crate) price: f64,
    pub(crate) total_duration_iso: String,
    pub(crate) segments: Vec<Segment>,
}

impl Itinerary {
    /// Builds an itinerary, or `None` when `segments` is empty.
    /// A negative or non-finite price is coerced to zero.
    pub fn new(
        id: impl Into<String>,
        airline_display_name: impl Into<String>,
        price: f64,
        total_duration_iso: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let price = if price.is_finite() && price >= 0.0 { price.abs() } else { 0.0 };
        Some(Self {
            id: id.into(),
            airline_display_name: airline_display_name.into(),
            price,
            total_duration_iso: total_duration_iso.into(),
            segments,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn airline_display_name(&self) -> &str {
        &self.airline_display_name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn total_duration_iso(&self) -> &str {
        &self.total_duration_iso
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn first_segment(&self) -> &Segment {
        &self.segments[0]
    }

    fn last_segment(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    pub fn departure_at(&self) -> &str {
        &self.first_segment().departure_at
    }

    pub fn origin_airport(&self) -> &str {
        &self.first_segment().departure_airport
    }

    pub fn arrival_at(&self) -> &str {
        &self.last_segment().arrival_at
    }

    pub fn destination_airport(&self) -> &str {
        &self.last_segment().arrival_airport
    }

    /// Intermediate landings between origin and final destination.
    pub fn stopovers(&self) -> usize {
        self.segments.len() - 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItineraryWire {
    #[serde(default)]
    id: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    price: f64,
    #[serde(default)]
    airline: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    departure_time: String,
    #[serde(default)]
    arrival_time: String,
    #[serde(default)]
    origin: String,
    #[serde(default)]
    destination: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

/// Saved records have carried the price as a number and as a decimal string.
/// Anything unreadable is 0, which `Itinerary::new` keeps.
fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

impl TryFrom<ItineraryWire> for Itinerary {
    type Error = CoreError;

    fn try_from(wire: ItineraryWire) -> Result<Self, Self::Error> {
        Itinerary::new(wire.id, wire.airline, wire.price, wire.duration, wire.segments)
            .ok_or_else(|| CoreError::ValidationError("itinerary has no segments".to_string()))
    }
}

impl From<Itinerary> for ItineraryWire {
    fn from(itinerary: Itinerary) -> Self {
        Self {
            departure_time: itinerary.departure_at().to_string(),
            arrival_time: itinerary.arrival_at().to_string(),
            origin: itinerary.origin_airport().to_string(),
            destination: itinerary.destination_airport().to_string(),
            id: itinerary.id,
            price: itinerary.price,
            airline: itinerary.airline_display_name,
            duration: itinerary.total_duration_iso,
            segments: itinerary.segments,
        }
    }
}

// ============================================================================
// Account records
// ============================================================================

/// A flight saved to the user's account; `itinerary.id()` is its identity hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFlight {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    #[serde(
        rename = "savedAt",
        default,
        serialize_with = "serialize_saved_at",
        deserialize_with = "deserialize_saved_at"
    )]
    pub saved_at_millis: i64,
}

impl SavedFlight {
    /// Decodes a saved-flights list one record at a time, skipping records
    /// that cannot be read.
    pub fn from_records(records: Vec<serde_json::Value>) -> Vec<SavedFlight> {
        records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<SavedFlight>(record) {
                Ok(saved) => Some(saved),
                Err(e) => {
                    tracing::warn!("Skipping unreadable saved flight: {}", e);
                    None
                }
            })
            .collect()
    }
}

fn serialize_saved_at<S: Serializer>(millis: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(*millis)
}

/// The account service has sent `savedAt` both as epoch millis and as an
/// RFC 3339 string. Anything else reads as 0 rather than failing the list.
fn deserialize_saved_at<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let millis = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => chrono::DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.timestamp_millis())
            .or_else(|| s.trim().parse::<i64>().ok()),
        _ => None,
    };
    Ok(millis.unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub date: String,
    #[serde(default)]
    pub created_at: String,
}

/// Airport suggestion from the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Airport {
    /// The code a search should use: IATA when present, else the raw code.
    pub fn display_code(&self) -> &str {
        self.iata.as_deref().filter(|c| !c.is_empty()).unwrap_or(&self.code)
    }

    /// `JFK - New York` style label.
    pub fn label(&self) -> String {
        match &self.city {
            Some(city) if !city.is_empty() => format!("{} - {}", self.display_code(), city),
            _ => self.display_code().to_string(),
        }
    }
}

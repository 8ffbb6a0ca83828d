use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{Itinerary, Segment};

// Field order is fixed by declaration, so the id of a saved flight is stable
// across processes of this crate. Provider fields outside this set never
// take part.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalSegment<'a> {
    carrier_code: &'a str,
    number: &'a str,
    departure: CanonicalEndpoint<'a>,
    arrival: CanonicalEndpoint<'a>,
    duration: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalEndpoint<'a> {
    iata_code: &'a str,
    at: &'a str,
}

impl<'a> From<&'a Segment> for CanonicalSegment<'a> {
    fn from(segment: &'a Segment) -> Self {
        Self {
            carrier_code: &segment.carrier_code,
            number: &segment.flight_number,
            departure: CanonicalEndpoint {
                iata_code: &segment.departure_airport,
                at: &segment.departure_at,
            },
            arrival: CanonicalEndpoint {
                iata_code: &segment.arrival_airport,
                at: &segment.arrival_at,
            },
            duration: &segment.duration_iso,
        }
    }
}

/// Compact JSON of the segment list, without the display carrier name.
pub(crate) fn canonical_segments(segments: &[Segment]) -> Vec<u8> {
    let canonical: Vec<CanonicalSegment<'_>> = segments.iter().map(CanonicalSegment::from).collect();
    // Only string fields: serialization cannot fail.
    serde_json::to_vec(&canonical).unwrap_or_default()
}

/// Content-addressed id of an itinerary: lowercase hex SHA-256 of its
/// canonical segment list. Price and offer id never take part.
pub fn identity_hash(segments: &[Segment]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_segments(segments));
    format!("{:x}", hasher.finalize())
}

impl Itinerary {
    pub fn identity_hash(&self) -> String {
        identity_hash(&self.segments)
    }

    /// A copy whose `id` is the identity hash, as saved flights are keyed.
    pub fn keyed_by_identity(&self) -> Itinerary {
        Itinerary {
            id: self.identity_hash(),
            ..self.clone()
        }
    }
}

use farefinder_core::duration::humanize_iso_duration;
use farefinder_core::{Airport, Itinerary, RecentSearch, SavedFlight};

pub fn itinerary_line(index: usize, itinerary: &Itinerary, favorited: bool) -> String {
    let stops = match itinerary.stopovers() {
        0 => "nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    };
    format!(
        "{:>3}. {} {} {} -> {} {}  {}  {}  {:.2}{}",
        index,
        itinerary.airline_display_name(),
        itinerary.origin_airport(),
        itinerary.departure_at(),
        itinerary.destination_airport(),
        itinerary.arrival_at(),
        humanize_iso_duration(itinerary.total_duration_iso()),
        stops,
        itinerary.price(),
        if favorited { "  *" } else { "" }
    )
}

pub fn segment_lines(itinerary: &Itinerary) -> Vec<String> {
    itinerary
        .segments()
        .iter()
        .map(|s| {
            format!(
                "       {} {}{}  {} {} -> {} {}  ({})",
                s.carrier_name,
                s.carrier_code,
                s.flight_number,
                s.departure_airport,
                s.departure_at,
                s.arrival_airport,
                s.arrival_at,
                humanize_iso_duration(&s.duration_iso)
            )
        })
        .collect()
}

pub fn saved_line(saved: &SavedFlight) -> String {
    let saved_at = chrono::DateTime::from_timestamp_millis(saved.saved_at_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!(
        "{}  {} {} -> {}  {:.2}  saved {}",
        saved.itinerary.id(),
        saved.itinerary.airline_display_name(),
        saved.itinerary.origin_airport(),
        saved.itinerary.destination_airport(),
        saved.itinerary.price(),
        saved_at
    )
}

pub fn airport_line(airport: &Airport) -> String {
    format!("{:<5} {}", airport.display_code(), airport.name)
        + &airport.city.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default()
}

pub fn recent_line(search: &RecentSearch) -> String {
    format!("{} -> {} on {}  ({})", search.origin, search.destination, search.date, search.created_at)
}

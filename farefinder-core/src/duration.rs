//! ISO-8601 durations as the flight provider sends them (`PT2H35M`, `P1DT2H`).

use chrono::Duration;

/// Parses `P[nW][nD][T[nH][nM][nS]]` with whole-number components.
/// Returns `None` for anything else, including fractional values.
pub fn parse_iso_duration(raw: &str) -> Option<Duration> {
    let rest = raw.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut seconds = components(date_part, &[('W', 604_800), ('D', 86_400)])?;
    if let Some(time) = time_part {
        if time.is_empty() {
            return None;
        }
        seconds = seconds.checked_add(components(time, &[('H', 3_600), ('M', 60), ('S', 1)])?)?;
    }
    Duration::try_seconds(seconds)
}

// Units must appear in the given order, each at most once.
fn components(part: &str, units: &[(char, i64)]) -> Option<i64> {
    let mut total: i64 = 0;
    let mut digits = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let offset = units[next_unit..].iter().position(|(unit, _)| *unit == ch)?;
        let (_, factor) = units[next_unit + offset];
        let value: i64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(factor)?)?;
        digits.clear();
        next_unit += offset + 1;
    }

    digits.is_empty().then_some(total)
}

/// Formats hours and minutes as `PT#H#M`; seconds are truncated.
pub fn format_iso_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    match (hours, minutes) {
        (0, m) => format!("PT{}M", m),
        (h, 0) => format!("PT{}H", h),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}

/// Sums segment durations; `None` if any of them does not parse.
pub fn total_duration<'a>(durations: impl IntoIterator<Item = &'a str>) -> Option<Duration> {
    durations
        .into_iter()
        .try_fold(Duration::zero(), |acc, raw| acc.checked_add(&parse_iso_duration(raw)?))
}

/// Short human form, `5h 35m`. Falls back to the raw text when unparseable.
pub fn humanize_iso_duration(raw: &str) -> String {
    match parse_iso_duration(raw) {
        Some(d) => {
            let minutes = d.num_minutes().max(0);
            match (minutes / 60, minutes % 60) {
                (0, m) => format!("{}m", m),
                (h, m) => format!("{}h {:02}m", h, m),
            }
        }
        None => raw.to_string(),
    }
}

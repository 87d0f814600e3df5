// Display helpers shared by the summary and log listings

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::day::DayWindow;

static FLEXIBLE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\s*$").expect("valid time regex")
});

/// `65.4` minutes becomes `1h5m`, `120` becomes `2h`, `42` becomes `42m`.
pub fn format_minutes_as_hm(minutes: f64) -> String {
    let total = minutes.round() as i64;
    let hours = total / 60;
    let mins = total % 60;
    match (hours, mins) {
        (h, m) if h > 0 && m > 0 => format!("{h}h{m}m"),
        (h, _) if h > 0 => format!("{h}h"),
        (_, m) => format!("{m}m"),
    }
}

/// Whole hours and minutes, truncated: `16h 0m`, `0h 45m`.
pub fn format_duration_hm(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

pub fn format_minutes_per_km(value: f64) -> String {
    let mut minutes = value.floor() as i64;
    let mut seconds = ((value - value.floor()) * 60.).round() as i64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{minutes} min {seconds:02} sec/km")
}

pub fn format_km_per_hour(value: f64) -> String {
    format!("{value:.1} km/h")
}

pub fn format_distance(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.)
}

/// Compact local 12-hour time such as `2:05pm`.
pub fn format_time_12h(instant: DateTime<Utc>, timezone: Tz) -> String {
    let local = instant.with_timezone(&timezone);
    let (is_pm, hour) = local.hour12();
    format!(
        "{}:{:02}{}",
        hour,
        local.minute(),
        if is_pm { "pm" } else { "am" }
    )
}

/// Local date and time such as `20 July, 2:05pm`.
pub fn format_date_time(instant: DateTime<Utc>, timezone: Tz) -> String {
    let local = instant.with_timezone(&timezone);
    format!(
        "{}, {}",
        local.format("%-d %B"),
        format_time_12h(instant, timezone)
    )
}

/// Parse loosely typed times like `2:30 PM`, `14:00` or `9am` into a time of
/// day. Returns `None` for anything that is not a valid clock time.
pub fn parse_flexible_time(input: &str) -> Option<NaiveTime> {
    let captures = FLEXIBLE_TIME.captures(input)?;
    let mut hours: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = captures
        .get(2)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;

    match captures.get(3).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("pm") if hours < 12 => hours += 12,
        Some("am") if hours == 12 => hours = 0,
        _ => {}
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Resolve a flexible time on the selected local day.
pub fn resolve_time_on_day(input: &str, day: &DayWindow) -> Option<DateTime<Utc>> {
    use chrono::TimeZone;

    let time = parse_flexible_time(input)?;
    day.timezone
        .from_local_datetime(&day.date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

// Local day boundaries in the dashboard's reference timezone

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use serde::Serialize;

use crate::errors::GlucodayError;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Australia::Sydney;

/// The `[start, end)` window of one local calendar day, expressed in UTC.
///
/// Days are not always 24 hours long: on daylight saving transitions the
/// window is 23 or 25 hours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Where the selected day sits relative to today.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayNavigation {
    pub previous: Option<NaiveDate>,
    /// `None` once the selected day is today
    pub next: Option<NaiveDate>,
    pub is_today: bool,
    pub can_go_forward: bool,
    /// Length of the selected day, 1380 or 1500 on DST transitions
    pub minutes: f64,
}

impl DayNavigation {
    pub fn at(day: &DayWindow, now: DateTime<Utc>) -> Self {
        Self {
            previous: day.previous().ok().map(|previous| previous.date),
            next: day.forward(now).ok().map(|next| next.date),
            is_today: day.is_today(now),
            can_go_forward: day.can_go_forward(now),
            minutes: day.minutes(),
        }
    }
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

impl DayWindow {
    pub fn for_date(date: NaiveDate, timezone: Tz) -> Result<Self, GlucodayError> {
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| GlucodayError::InvalidDate {
                input: date.to_string(),
            })?;
        Ok(Self {
            date,
            timezone,
            start: local_midnight(date, timezone)?,
            end: local_midnight(next, timezone)?,
        })
    }

    /// The local day containing `instant`.
    pub fn containing(instant: DateTime<Utc>, timezone: Tz) -> Result<Self, GlucodayError> {
        Self::for_date(instant.with_timezone(&timezone).date_naive(), timezone)
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse(input: &str, timezone: Tz) -> Result<Self, GlucodayError> {
        let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
            GlucodayError::InvalidDate {
                input: input.to_string(),
            }
        })?;
        Self::for_date(date, timezone)
    }

    pub fn previous(&self) -> Result<Self, GlucodayError> {
        let date = self
            .date
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| GlucodayError::InvalidDate {
                input: self.date.to_string(),
            })?;
        Self::for_date(date, self.timezone)
    }

    pub fn next(&self) -> Result<Self, GlucodayError> {
        let date = self
            .date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| GlucodayError::InvalidDate {
                input: self.date.to_string(),
            })?;
        Self::for_date(date, self.timezone)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether `[start, end)` shares any time with the day. A missing end
    /// means the interval is still running.
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        start < self.end && end.is_none_or(|end| end > self.start)
    }

    pub fn is_today(&self, now: DateTime<Utc>) -> bool {
        self.contains(now)
    }

    /// Navigating forward is disabled once the selected day is today.
    pub fn can_go_forward(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }

    /// The following day, unless the selected day is already today.
    pub fn forward(&self, now: DateTime<Utc>) -> Result<Self, GlucodayError> {
        if !self.can_go_forward(now) {
            return Err(GlucodayError::InvalidUserInput {
                field: "date".to_string(),
                reason: format!("cannot move past {}, it is today or later", self.date),
            });
        }
        self.next()
    }

    pub fn minutes(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 60.
    }
}

/// Resolve local midnight for `date`. When midnight falls into a DST gap the
/// first valid instant after the transition is used.
fn local_midnight(date: NaiveDate, timezone: Tz) -> Result<DateTime<Utc>, GlucodayError> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    if let Some(dt) = timezone.from_local_datetime(&naive).earliest() {
        return Ok(dt.with_timezone(&Utc));
    }

    // Midnight does not exist on this date, walk forward to the first valid minute.
    for minutes in 1..=120 {
        let candidate = naive + chrono::Duration::minutes(minutes);
        if let Some(dt) = timezone.from_local_datetime(&candidate).earliest() {
            warn!(
                "Midnight does not exist on {} in {}; day starts at {}",
                date, timezone, candidate
            );
            return Ok(dt.with_timezone(&Utc));
        }
    }

    Err(GlucodayError::UnresolvableDayBoundary {
        date: date.to_string(),
        timezone: timezone.name().to_string(),
    })
}

pub fn parse_timezone(name: &str) -> Result<Tz, GlucodayError> {
    name.parse::<Tz>()
        .map_err(|_| GlucodayError::UnknownTimezone {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_sydney_day_boundaries() {
        // AEST is UTC+10 in July
        let day = DayWindow::parse("2025-07-20", DEFAULT_TIMEZONE).unwrap();
        assert_eq!(day.start, utc(2025, 7, 19, 14, 0));
        assert_eq!(day.end, utc(2025, 7, 20, 14, 0));
        assert_eq!(day.minutes(), 1440.);
    }

    #[test]
    fn test_dst_days_are_not_24_hours() {
        // Sydney springs forward on 2025-10-05 and falls back on 2025-04-06
        let short = DayWindow::parse("2025-10-05", DEFAULT_TIMEZONE).unwrap();
        assert_eq!(short.minutes(), 1380.);
        let long = DayWindow::parse("2025-04-06", DEFAULT_TIMEZONE).unwrap();
        assert_eq!(long.minutes(), 1500.);
    }

    #[test]
    fn test_navigation() {
        let day = DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap();
        assert_eq!(day.previous().unwrap().date.to_string(), "2025-07-19");
        assert_eq!(day.next().unwrap().date.to_string(), "2025-07-21");
        assert_eq!(day.next().unwrap().start, day.end);
    }

    #[test]
    fn test_contains_is_half_open() {
        let day = DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap();
        assert!(day.contains(day.start));
        assert!(!day.contains(day.end));
    }

    #[test]
    fn test_overlaps() {
        let day = DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap();
        assert!(day.overlaps(utc(2025, 7, 19, 22, 0), None));
        assert!(day.overlaps(utc(2025, 7, 19, 22, 0), Some(utc(2025, 7, 20, 1, 0))));
        assert!(!day.overlaps(utc(2025, 7, 19, 22, 0), Some(day.start)));
        assert!(!day.overlaps(day.end, None));
    }

    #[test]
    fn test_forward_navigation_disabled_today() {
        let day = DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap();
        let now = utc(2025, 7, 20, 9, 30);
        assert!(day.is_today(now));
        assert!(!day.can_go_forward(now));
        assert!(day.previous().unwrap().can_go_forward(now));
    }

    #[test]
    fn test_forward_and_navigation_state() {
        let day = DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap();
        let now = utc(2025, 7, 20, 9, 30);
        assert!(matches!(
            day.forward(now),
            Err(GlucodayError::InvalidUserInput { .. })
        ));
        let yesterday = day.previous().unwrap();
        assert_eq!(yesterday.forward(now).unwrap(), day);

        let today = DayNavigation::at(&day, now);
        assert_eq!(today.previous.unwrap().to_string(), "2025-07-19");
        assert_eq!(today.next, None);
        assert!(today.is_today);
        assert!(!today.can_go_forward);
        assert_eq!(today.minutes, 1440.);

        let earlier = DayNavigation::at(&yesterday, now);
        assert_eq!(earlier.next, Some(day.date));
        assert!(!earlier.is_today);
        assert!(earlier.can_go_forward);
    }

    #[test]
    fn test_containing_uses_local_date() {
        // 20:00 UTC on the 19th is already the 20th in Sydney
        let day = DayWindow::containing(utc(2025, 7, 19, 20, 0), DEFAULT_TIMEZONE).unwrap();
        assert_eq!(day.date.to_string(), "2025-07-20");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            DayWindow::parse("20/07/2025", DEFAULT_TIMEZONE),
            Err(GlucodayError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(GlucodayError::UnknownTimezone { .. })
        ));
        assert_eq!(parse_timezone("Europe/London").unwrap().name(), "Europe/London");
    }
}

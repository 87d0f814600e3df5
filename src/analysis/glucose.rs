use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{day::DayWindow, records::GlucoseReading};

/// How long the last reading of a series is assumed to hold.
pub const FINAL_READING_VALIDITY_MINUTES: i64 = 5;
/// Nominal length of a day used for the uncovered-minutes display.
pub const MINUTES_PER_DAY: f64 = 1440.;

pub const LOW_THRESHOLD: f64 = 4.;
pub const TARGET_UPPER_THRESHOLD: f64 = 6.;
pub const HIGH_THRESHOLD: f64 = 8.;
pub const VERY_HIGH_THRESHOLD: f64 = 10.;

/// Minutes spent in each glucose band over one day.
///
/// The bands overlap: a reading above 10 counts toward both `time_above_8`
/// and `time_above_10`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInRange {
    pub time_below_4: f64,
    pub time_between_4_and_6: f64,
    pub time_above_8: f64,
    pub time_above_10: f64,
    pub total_covered_minutes: f64,
}

impl TimeInRange {
    /// Minutes of the day that no reading accounted for.
    pub fn uncovered_minutes(&self) -> f64 {
        MINUTES_PER_DAY - self.total_covered_minutes
    }

    fn add(&mut self, value: f64, minutes: f64) {
        self.total_covered_minutes += minutes;
        if value < LOW_THRESHOLD {
            self.time_below_4 += minutes;
        }
        if (LOW_THRESHOLD..=TARGET_UPPER_THRESHOLD).contains(&value) {
            self.time_between_4_and_6 += minutes;
        }
        if value > HIGH_THRESHOLD {
            self.time_above_8 += minutes;
        }
        if value > VERY_HIGH_THRESHOLD {
            self.time_above_10 += minutes;
        }
    }
}

/// Integrates irregularly spaced readings into per-band minutes.
pub struct GlucoseRangeAggregator {
    day: DayWindow,
}

impl GlucoseRangeAggregator {
    pub fn new(day: DayWindow) -> Self {
        Self { day }
    }

    /// Each reading holds until the next one. The last reading holds for
    /// [`FINAL_READING_VALIDITY_MINUTES`], but never past the end of the day.
    pub fn aggregate(&self, readings: &[GlucoseReading]) -> TimeInRange {
        let readings = readings_for_day(readings, &self.day);
        let mut summary = TimeInRange::default();

        for (i, current) in readings.iter().enumerate() {
            let end = match readings.get(i + 1) {
                Some(next) => next.timestamp,
                None => (current.timestamp + Duration::minutes(FINAL_READING_VALIDITY_MINUTES))
                    .min(self.day.end),
            };
            let minutes = (end - current.timestamp).num_milliseconds() as f64 / 60_000.;
            summary.add(current.value, minutes);
        }
        summary
    }
}

/// Readings inside the day, in time order. Readings sharing a timestamp keep
/// their original relative order.
pub fn readings_for_day(readings: &[GlucoseReading], day: &DayWindow) -> Vec<GlucoseReading> {
    readings
        .iter()
        .filter(|reading| day.contains(reading.timestamp))
        .copied()
        .sorted_by_key(|reading| reading.timestamp)
        .collect()
}

/// The reading closest in time to `at`. On ties the later reading in the
/// sequence wins.
pub fn nearest_reading(readings: &[GlucoseReading], at: DateTime<Utc>) -> Option<&GlucoseReading> {
    readings
        .iter()
        .rev()
        .min_by_key(|reading| (reading.timestamp - at).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day() -> DayWindow {
        DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 20, hour, minute, 0).unwrap()
    }

    fn reading(hour: u32, minute: u32, value: f64) -> GlucoseReading {
        GlucoseReading::new(at(hour, minute), value)
    }

    #[test]
    fn test_single_high_reading_counts_validity_window() {
        let summary = GlucoseRangeAggregator::new(day()).aggregate(&[reading(0, 0, 11.)]);
        assert_eq!(summary.total_covered_minutes, 5.);
        assert_eq!(summary.time_above_8, 5.);
        assert_eq!(summary.time_above_10, 5.);
        assert_eq!(summary.time_below_4, 0.);
        assert_eq!(summary.uncovered_minutes(), 1435.);
    }

    #[test]
    fn test_two_readings_in_short_window() {
        let day = DayWindow {
            end: at(0, 20),
            ..day()
        };
        let summary =
            GlucoseRangeAggregator::new(day).aggregate(&[reading(0, 0, 3.), reading(0, 10, 9.)]);
        assert_eq!(summary.time_below_4, 10.);
        assert_eq!(summary.time_above_8, 5.);
        assert_eq!(summary.time_above_10, 0.);
        assert_eq!(summary.total_covered_minutes, 15.);
    }

    #[test]
    fn test_last_reading_clipped_at_day_end() {
        let summary = GlucoseRangeAggregator::new(day()).aggregate(&[reading(23, 58, 5.)]);
        assert_eq!(summary.total_covered_minutes, 2.);
        assert_eq!(summary.time_between_4_and_6, 2.);
    }

    #[test]
    fn test_band_boundaries() {
        let summary = GlucoseRangeAggregator::new(day()).aggregate(&[
            reading(1, 0, 4.),
            reading(1, 10, 6.),
            reading(1, 20, 8.),
            reading(1, 30, 10.),
            reading(1, 40, 3.9),
        ]);
        assert_eq!(summary.time_between_4_and_6, 20.);
        // 8 and 10 are not above their own thresholds, 10 is above 8
        assert_eq!(summary.time_above_8, 10.);
        assert_eq!(summary.time_above_10, 0.);
        assert_eq!(summary.time_below_4, 5.);
        assert_eq!(summary.total_covered_minutes, 45.);
    }

    #[test]
    fn test_readings_outside_day_ignored_and_unsorted_input_sorted() {
        let day = day();
        let summary = GlucoseRangeAggregator::new(day).aggregate(&[
            reading(2, 10, 7.),
            GlucoseReading::new(day.start - Duration::minutes(30), 2.),
            reading(2, 0, 5.),
            GlucoseReading::new(day.end, 15.),
        ]);
        assert_eq!(summary.time_between_4_and_6, 10.);
        assert_eq!(summary.total_covered_minutes, 15.);
        assert_eq!(summary.time_below_4, 0.);
        assert_eq!(summary.time_above_10, 0.);
    }

    #[test]
    fn test_empty_readings() {
        let summary = GlucoseRangeAggregator::new(day()).aggregate(&[]);
        assert_eq!(summary, TimeInRange::default());
        assert_eq!(summary.uncovered_minutes(), MINUTES_PER_DAY);
    }

    #[test]
    fn test_nearest_reading_last_duplicate_wins() {
        let readings = vec![
            reading(1, 0, 5.),
            reading(2, 0, 6.),
            reading(2, 0, 7.),
            reading(3, 0, 8.),
        ];
        assert_eq!(nearest_reading(&readings, at(2, 10)).unwrap().value, 7.);
        assert_eq!(nearest_reading(&readings, at(0, 0)).unwrap().value, 5.);
        // Equidistant between 2:00 and 3:00 resolves to the later reading
        assert_eq!(nearest_reading(&readings, at(2, 30)).unwrap().value, 8.);
        assert!(nearest_reading(&[], at(2, 30)).is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_covered_minutes_bound_band_totals(
            samples in prop::collection::vec((0i64..1440 * 60, 1.0f64..25.0), 0..200),
        ) {
            let day = day();
            let readings = samples
                .into_iter()
                .map(|(secs, value)| GlucoseReading::new(day.start + Duration::seconds(secs), value))
                .collect_vec();
            let summary = GlucoseRangeAggregator::new(day).aggregate(&readings);

            prop_assert!(summary.total_covered_minutes <= MINUTES_PER_DAY + 1e-9);
            prop_assert!(
                summary.time_below_4 + summary.time_between_4_and_6
                    <= summary.total_covered_minutes + 1e-9
            );
            prop_assert!(summary.time_above_10 <= summary.time_above_8 + 1e-9);
        }
    }
}

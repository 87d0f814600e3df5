use itertools::Itertools;
use log::debug;

use crate::{
    analysis::glucose::nearest_reading,
    day::DayWindow,
    records::{BolusDose, Fast, FoodLog, GlucoseReading, Note, Workout},
};

use super::{
    BolusBar, FastLabel, FastSpan, FoodPoint, LinePoint, Marker, MarkerKind, WorkoutDetails,
    WorkoutStep,
};

/// Glucose value assumed when there is no reading to anchor a marker to.
const DEFAULT_ANCHOR_GLUCOSE: f64 = 6.;
const BOLUS_MARKER_OFFSET: f64 = 3.;
const NOTE_MARKER_OFFSET: f64 = 5.;

const HEART_RATE_MIN: f64 = 80.;
const HEART_RATE_MAX: f64 = 180.;
const SCALED_GLUCOSE_MIN: f64 = 2.;
const SCALED_GLUCOSE_MAX: f64 = 15.;

pub fn glucose_line(readings: &[GlucoseReading]) -> Vec<LinePoint> {
    readings
        .iter()
        .map(|reading| LinePoint {
            x: reading.timestamp,
            y: reading.value,
        })
        .collect()
}

pub fn bolus_bars(day: &DayWindow, boluses: &[BolusDose]) -> Vec<BolusBar> {
    boluses
        .iter()
        .filter(|dose| day.contains(dose.timestamp))
        .map(|dose| BolusBar {
            x: dose.timestamp,
            y: dose.amount,
            notes: dose.notes.clone(),
            source: dose.source.clone(),
        })
        .collect()
}

fn anchor_glucose(readings: &[GlucoseReading], at: chrono::DateTime<chrono::Utc>) -> f64 {
    nearest_reading(readings, at).map_or(DEFAULT_ANCHOR_GLUCOSE, |reading| reading.value)
}

/// Bolus dots sit above the glucose line when it is high and below it when
/// it is low.
pub fn bolus_markers(
    day: &DayWindow,
    boluses: &[BolusDose],
    readings: &[GlucoseReading],
) -> Vec<Marker> {
    boluses
        .iter()
        .filter(|dose| day.contains(dose.timestamp))
        .map(|dose| {
            let bg = anchor_glucose(readings, dose.timestamp);
            Marker {
                x: dose.timestamp,
                y: if bg >= DEFAULT_ANCHOR_GLUCOSE {
                    bg + BOLUS_MARKER_OFFSET
                } else {
                    bg - BOLUS_MARKER_OFFSET
                },
                kind: MarkerKind::Bolus,
                label: format!("{:.2}U", dose.amount),
            }
        })
        .collect()
}

/// Note icons are nudged the opposite way to bolus dots so the two never
/// cover each other or the glucose line.
pub fn note_markers(day: &DayWindow, notes: &[Note], readings: &[GlucoseReading]) -> Vec<Marker> {
    notes
        .iter()
        .filter(|note| day.contains(note.timestamp))
        .map(|note| {
            let bg = anchor_glucose(readings, note.timestamp);
            Marker {
                x: note.timestamp,
                y: if bg >= DEFAULT_ANCHOR_GLUCOSE {
                    bg - NOTE_MARKER_OFFSET
                } else {
                    bg + NOTE_MARKER_OFFSET
                },
                kind: MarkerKind::Note,
                label: note.text.clone(),
            }
        })
        .collect()
}

pub fn food_points(day: &DayWindow, logs: &[FoodLog]) -> Vec<FoodPoint> {
    logs.iter()
        .filter(|log| day.contains(log.timestamp))
        .map(|log| FoodPoint {
            x: log.timestamp,
            y: log.net_carbs,
            food_name: log.food_name.clone(),
            calories: log.calories,
            fat: log.fat,
        })
        .collect()
}

/// Map a heart rate onto the glucose axis so workouts can share the glucose
/// chart. Rates are clamped to 80..=180 bpm.
pub fn scale_heart_rate_to_glucose(heart_rate: f64) -> f64 {
    let clamped = heart_rate.clamp(HEART_RATE_MIN, HEART_RATE_MAX);
    let ratio = (clamped - HEART_RATE_MIN) / (HEART_RATE_MAX - HEART_RATE_MIN);
    SCALED_GLUCOSE_MIN + ratio * (SCALED_GLUCOSE_MAX - SCALED_GLUCOSE_MIN)
}

/// Workouts that started on the day and have what the step chart needs.
fn chartable_workouts<'a>(
    day: &'a DayWindow,
    workouts: &'a [Workout],
) -> impl Iterator<Item = &'a Workout> + 'a {
    workouts
        .iter()
        .filter(|w| day.contains(w.start) && w.end_time.is_some() && w.average_heart_rate > 0.)
        .sorted_by_key(|w| w.start)
}

/// One marker per workout started on the day, placed by its average heart rate.
pub fn workout_markers(day: &DayWindow, workouts: &[Workout]) -> Vec<Marker> {
    workouts
        .iter()
        .filter(|w| day.contains(w.start))
        .sorted_by_key(|w| w.start)
        .map(|w| {
            let heart_rate = w.average_heart_rate.round();
            Marker {
                x: w.start,
                y: scale_heart_rate_to_glucose(heart_rate),
                kind: MarkerKind::Workout,
                label: format!(
                    "{} ({} bpm, {} min)",
                    w.name,
                    heart_rate,
                    (w.duration / 60.).round()
                ),
            }
        })
        .collect()
}

/// Average heart rate drawn as a flat step per workout, with an empty pair of
/// points between workouts so the line breaks.
pub fn workout_steps(day: &DayWindow, workouts: &[Workout]) -> Vec<WorkoutStep> {
    let mut steps = Vec::new();
    let mut last_end = None;

    for w in chartable_workouts(day, workouts) {
        let Some(end) = w.end_time else { continue };
        let heart_rate = w.average_heart_rate.round();

        if let Some(last_end) = last_end.filter(|last_end| w.start > *last_end) {
            steps.push(WorkoutStep {
                x: last_end,
                y: None,
                details: None,
            });
            steps.push(WorkoutStep {
                x: w.start,
                y: None,
                details: None,
            });
        }

        let details = WorkoutDetails {
            segment_start: w.start,
            segment_end: end,
            name: w.name.clone(),
            workout_type: w.workout_type.clone(),
            notes: w.notes.clone(),
            source: w.source.clone(),
            active_calories: w.active_calories,
            average_heart_rate: w.average_heart_rate,
            max_heart_rate: w.max_heart_rate,
            duration: w.duration,
            elapsed_time: w.elapsed_time,
            distance: w.distance,
            km_per_hour: w.km_per_hour,
            minutes_per_km: w.minutes_per_km,
            tags: w.tags.clone(),
        };
        steps.push(WorkoutStep {
            x: w.start,
            y: Some(heart_rate),
            details: Some(details.clone()),
        });
        steps.push(WorkoutStep {
            x: end,
            y: Some(heart_rate),
            details: Some(details),
        });
        last_end = Some(end);
    }
    debug!("Built {} workout step points for {}", steps.len(), day.date);
    steps
}

/// Where a fast sits relative to the day.
pub fn fast_label(day: &DayWindow, fast: &Fast) -> FastLabel {
    let started_today = day.contains(fast.start_time);
    let ended_today = fast.end_time.is_some_and(|end| day.contains(end));
    match (started_today, ended_today) {
        (true, true) => FastLabel::StartedAndEnded,
        (true, false) => FastLabel::Started,
        (false, true) => FastLabel::Ended,
        (false, false) => FastLabel::Continued,
    }
}

pub fn fast_spans(day: &DayWindow, fasts: &[Fast]) -> Vec<FastSpan> {
    fasts
        .iter()
        .filter(|fast| day.overlaps(fast.start_time, fast.end_time))
        .map(|fast| FastSpan {
            start: fast.start_time,
            end: fast.end_time,
            label: fast_label(day, fast),
            duration_minutes: fast.duration().map(|d| d.num_minutes()),
            notes: fast.notes.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day() -> DayWindow {
        DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 20, hour, minute, 0).unwrap()
    }

    fn workout(start: DateTime<Utc>, minutes: i64, heart_rate: f64) -> Workout {
        Workout {
            start,
            end_time: Some(start + Duration::minutes(minutes)),
            name: "Run".to_string(),
            duration: (minutes * 60) as f64,
            average_heart_rate: heart_rate,
            ..Default::default()
        }
    }

    #[test]
    fn test_bolus_markers_nudged_around_glucose() {
        let readings = vec![
            GlucoseReading::new(at(8, 0), 9.),
            GlucoseReading::new(at(12, 0), 4.5),
        ];
        let boluses = vec![
            BolusDose::new(at(8, 2), 3.),
            BolusDose::new(at(12, 1), 1.),
            BolusDose::new(day().end, 5.),
        ];
        let markers = bolus_markers(&day(), &boluses, &readings);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].y, 12.);
        assert_eq!(markers[1].y, 1.5);
        assert_eq!(markers[0].label, "3.00U");
    }

    #[test]
    fn test_markers_without_readings_use_default_anchor() {
        let boluses = vec![BolusDose::new(at(8, 0), 2.)];
        assert_eq!(bolus_markers(&day(), &boluses, &[])[0].y, 9.);

        let notes = vec![Note {
            timestamp: at(9, 0),
            text: "coffee".to_string(),
            ..Default::default()
        }];
        assert_eq!(note_markers(&day(), &notes, &[])[0].y, 1.);
    }

    #[test]
    fn test_note_markers_nudged_away_from_line() {
        let readings = vec![GlucoseReading::new(at(9, 0), 4.)];
        let notes = vec![Note {
            timestamp: at(9, 5),
            text: "hypo".to_string(),
            ..Default::default()
        }];
        let markers = note_markers(&day(), &notes, &readings);
        assert_eq!(markers[0].y, 9.);
        assert_eq!(markers[0].kind, MarkerKind::Note);
    }

    #[test]
    fn test_heart_rate_scaling() {
        assert_eq!(scale_heart_rate_to_glucose(60.), 2.);
        assert_eq!(scale_heart_rate_to_glucose(130.), 8.5);
        assert_eq!(scale_heart_rate_to_glucose(200.), 15.);
    }

    #[test]
    fn test_workout_steps_break_between_workouts() {
        let workouts = vec![
            workout(at(17, 0), 30, 151.4),
            workout(at(7, 0), 45, 132.6),
            // No heart rate, not charted
            workout(at(12, 0), 20, 0.),
        ];
        let steps = workout_steps(&day(), &workouts);
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0].x, at(7, 0));
        assert_eq!(steps[0].y, Some(133.));
        assert_eq!(steps[1].x, at(7, 45));
        assert_eq!(steps[2].y, None);
        assert_eq!(steps[2].x, at(7, 45));
        assert_eq!(steps[3].x, at(17, 0));
        assert!(steps[3].details.is_none());
        assert_eq!(steps[4].y, Some(151.));
        assert_eq!(
            steps[5].details.as_ref().unwrap().segment_end,
            at(17, 30)
        );
    }

    #[test]
    fn test_every_workout_of_the_day_gets_a_marker() {
        let mut open = workout(at(12, 0), 20, 0.);
        open.end_time = None;
        let workouts = vec![
            workout(at(17, 0), 30, 130.),
            open,
            workout(day().end, 30, 140.),
        ];
        let markers = workout_markers(&day(), &workouts);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].x, at(12, 0));
        // Missing heart rate is clamped to the bottom of the scale
        assert_eq!(markers[0].y, 2.);
        assert_eq!(markers[1].y, 8.5);
        assert_eq!(markers[1].kind, MarkerKind::Workout);

        // The step chart still needs an end and a heart rate
        assert_eq!(workout_steps(&day(), &workouts).len(), 2);
    }

    #[test]
    fn test_back_to_back_workouts_have_no_gap() {
        let workouts = vec![workout(at(7, 0), 30, 120.), workout(at(7, 30), 30, 140.)];
        let steps = workout_steps(&day(), &workouts);
        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|s| s.y.is_some()));
    }

    #[test]
    fn test_fast_labels() {
        let day = day();
        let fast = |start: DateTime<Utc>, end: Option<DateTime<Utc>>| Fast {
            start_time: start,
            end_time: end,
            notes: None,
        };
        let fasts = vec![
            fast(at(1, 0), Some(at(9, 0))),
            fast(at(20, 0), None),
            fast(day.start - Duration::hours(6), Some(at(10, 0))),
            fast(day.start - Duration::hours(6), Some(day.end + Duration::hours(1))),
            fast(day.start - Duration::hours(10), Some(day.start - Duration::hours(2))),
        ];
        let spans = fast_spans(&day, &fasts);
        assert_eq!(
            spans.iter().map(|s| s.label).collect_vec(),
            vec![
                FastLabel::StartedAndEnded,
                FastLabel::Started,
                FastLabel::Ended,
                FastLabel::Continued,
            ]
        );
        assert_eq!(spans[0].duration_minutes, Some(480));
        assert_eq!(spans[1].duration_minutes, None);
    }
}

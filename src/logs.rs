// Per-day log listings shown next to the charts

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    charts::series::fast_label,
    day::DayWindow,
    format::{
        format_date_time, format_distance, format_duration_hm, format_km_per_hour,
        format_minutes_per_km, format_time_12h,
    },
    records::{BolusDose, Fast, FoodLog, Note, Workout},
    source::DaySnapshot,
};

/// One line of a log listing with its detail rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Instant the cursor jumps to when the entry is picked
    pub at: DateTime<Utc>,
    pub heading: String,
    pub details: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLogs {
    pub boluses: Vec<LogEntry>,
    pub food: Vec<LogEntry>,
    pub workouts: Vec<LogEntry>,
    pub fasts: Vec<LogEntry>,
    pub notes: Vec<LogEntry>,
}

impl DayLogs {
    pub fn build(day: &DayWindow, snapshot: &DaySnapshot) -> Self {
        Self {
            boluses: bolus_log(day, snapshot.boluses.records()),
            food: food_log(day, snapshot.food_logs.records()),
            workouts: workout_log(day, snapshot.workouts.records()),
            fasts: fast_log(day, snapshot.fasts.records()),
            notes: note_log(day, snapshot.notes.records()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boluses.is_empty()
            && self.food.is_empty()
            && self.workouts.is_empty()
            && self.fasts.is_empty()
            && self.notes.is_empty()
    }
}

pub fn bolus_log(day: &DayWindow, boluses: &[BolusDose]) -> Vec<LogEntry> {
    boluses
        .iter()
        .filter(|dose| day.contains(dose.timestamp))
        .sorted_by_key(|dose| dose.timestamp)
        .map(|dose| {
            let mut details = Vec::new();
            if let Some(ratio) = dose.carb_ratio_used {
                details.push(format!("Ratio: 1:{}", ratio));
            }
            if let Some(notes) = &dose.notes {
                details.push(notes.clone());
            }
            LogEntry {
                at: dose.timestamp,
                heading: format!(
                    "{}: {:.2}U",
                    format_time_12h(dose.timestamp, day.timezone),
                    dose.amount
                ),
                details,
                tags: dose.tags.clone(),
            }
        })
        .collect()
}

pub fn food_log(day: &DayWindow, logs: &[FoodLog]) -> Vec<LogEntry> {
    logs.iter()
        .filter(|log| day.contains(log.timestamp))
        .sorted_by_key(|log| log.timestamp)
        .map(|log| LogEntry {
            at: log.timestamp,
            heading: format!(
                "{}: {}",
                format_time_12h(log.timestamp, day.timezone),
                log.food_name
            ),
            details: vec![
                format!("Net carbs: {}g", log.net_carbs),
                format!("Total carbs: {}g", log.total_carbs),
                format!("Fat: {}g", log.fat),
                format!("Protein: {}g", log.protein),
                format!("Fibre: {}g", log.fibre),
                format!("Calories: {}", log.calories),
            ],
            tags: Vec::new(),
        })
        .collect()
}

/// Workouts that started on the day. Distance, speed and pace are listed
/// only when recorded.
pub fn workout_log(day: &DayWindow, workouts: &[Workout]) -> Vec<LogEntry> {
    let tz = day.timezone;
    workouts
        .iter()
        .filter(|w| day.contains(w.start))
        .sorted_by_key(|w| w.start)
        .map(|w| {
            let mut details = vec![
                format!("Duration: {} min", (w.duration / 60.).round()),
                format!("Average H/R: {}bpm", w.average_heart_rate.round()),
                format!("Max H/R: {}bpm", w.max_heart_rate),
                format!("Calories: {}", w.active_calories.round()),
                format!("Start: {}", format_time_12h(w.start, tz)),
                format!(
                    "End: {}",
                    w.end_time
                        .map_or("Ongoing".to_string(), |end| format_time_12h(end, tz))
                ),
                format!("Elapsed time: {} min", (w.elapsed_time / 60.).round()),
            ];
            if w.distance > 0. {
                details.push(format!("Distance: {}", format_distance(w.distance)));
            }
            if w.km_per_hour > 0. {
                details.push(format!("Speed: {}", format_km_per_hour(w.km_per_hour)));
            }
            if w.minutes_per_km > 0. {
                details.push(format!("Pace: {}", format_minutes_per_km(w.minutes_per_km)));
            }
            if let Some(notes) = &w.notes {
                details.push(format!("Notes: {}", notes));
            }
            LogEntry {
                at: w.start,
                heading: w.name.clone(),
                details,
                tags: w.tags.clone(),
            }
        })
        .collect()
}

/// Fasts touching the day, labelled by whether they started or ended on it.
pub fn fast_log(day: &DayWindow, fasts: &[Fast]) -> Vec<LogEntry> {
    let tz = day.timezone;
    fasts
        .iter()
        .filter(|fast| day.overlaps(fast.start_time, fast.end_time))
        .sorted_by_key(|fast| fast.start_time)
        .map(|fast| {
            let mut details = Vec::new();
            if let Some(duration) = fast.duration() {
                details.push(format!("Duration: {}", format_duration_hm(duration)));
            }
            details.push(format!("Start: {}", format_date_time(fast.start_time, tz)));
            details.push(format!(
                "End: {}",
                fast.end_time
                    .map_or("Ongoing".to_string(), |end| format_date_time(end, tz))
            ));
            if let Some(notes) = &fast.notes {
                details.push(notes.clone());
            }
            LogEntry {
                at: fast.start_time.max(day.start),
                heading: fast_label(day, fast).text().to_string(),
                details,
                tags: Vec::new(),
            }
        })
        .collect()
}

pub fn note_log(day: &DayWindow, notes: &[Note]) -> Vec<LogEntry> {
    notes
        .iter()
        .filter(|note| day.contains(note.timestamp))
        .sorted_by_key(|note| note.timestamp)
        .map(|note| LogEntry {
            at: note.timestamp,
            heading: format!(
                "{}: {}",
                format_time_12h(note.timestamp, day.timezone),
                note.text
            ),
            details: note.title.iter().cloned().collect(),
            tags: note.tags.clone(),
        })
        .collect()
}

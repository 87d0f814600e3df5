// Record types loaded for a single day

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A recorded basal insulin delivery rate over an interval.
///
/// `end_time == None` marks the segment the pump is still delivering. It has to
/// be closed against a reference instant (usually the last pump upload) before
/// it can be drawn with a definite end.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasalEntry {
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Units per hour
    pub rate: f64,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BasalEntry {
    pub fn new(start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>, rate: f64) -> Self {
        Self {
            start_time,
            end_time,
            rate,
            mode: None,
            notes: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// A single sensor glucose reading in mmol/L.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GlucoseReading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl GlucoseReading {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BolusDose {
    pub timestamp: DateTime<Utc>,
    /// Units
    pub amount: f64,
    #[serde(default, rename = "type")]
    pub bolus_type: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub carb_ratio_used: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BolusDose {
    pub fn new(timestamp: DateTime<Utc>, amount: f64) -> Self {
        Self {
            timestamp,
            amount,
            bolus_type: None,
            duration: None,
            notes: None,
            carb_ratio_used: None,
            source: None,
            tags: Vec::new(),
        }
    }
}

/// Nutrition values are in grams except calories.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodLog {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub net_carbs: f64,
    #[serde(default)]
    pub total_carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fibre: f64,
    #[serde(default)]
    pub calories: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(alias = "startTime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note_number: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(alias = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub workout_type: String,
    /// Moving time in seconds
    #[serde(default)]
    pub duration: f64,
    /// Wall clock time in seconds
    #[serde(default)]
    pub elapsed_time: f64,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub active_calories: f64,
    #[serde(default)]
    pub average_heart_rate: f64,
    #[serde(default)]
    pub max_heart_rate: f64,
    #[serde(default)]
    pub km_per_hour: f64,
    #[serde(default)]
    pub minutes_per_km: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fast {
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Fast {
    /// Length of a completed fast. Ongoing fasts have no duration yet.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// One line of a JSON-lines record file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum RecordLine {
    Glucose(GlucoseReading),
    Basal(BasalEntry),
    Bolus(BolusDose),
    Food(FoodLog),
    Note(Note),
    Workout(Workout),
    Fast(Fast),
    PumpUpload(DateTime<Utc>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_basal_entry_open_end_deserializes_as_none() {
        let entry: BasalEntry = serde_json::from_str(
            r#"{"startTime":"2025-07-20T01:00:00Z","endTime":null,"rate":0.85,"mode":"auto"}"#,
        )
        .unwrap();
        assert!(entry.is_open());
        assert_eq!(entry.mode.as_deref(), Some("auto"));
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_note_accepts_start_time_alias() {
        let note: Note = serde_json::from_str(
            r#"{"startTime":"2025-07-20T03:15:00Z","noteNumber":12,"text":"walk","tags":["exercise"]}"#,
        )
        .unwrap();
        assert_eq!(
            note.timestamp,
            Utc.with_ymd_and_hms(2025, 7, 20, 3, 15, 0).unwrap()
        );
        assert_eq!(note.note_number, 12);
    }

    #[test]
    fn test_fast_duration() {
        let fast = Fast {
            start_time: Utc.with_ymd_and_hms(2025, 7, 20, 0, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2025, 7, 20, 16, 30, 0).unwrap()),
            notes: None,
        };
        assert_eq!(fast.duration(), Some(Duration::minutes(16 * 60 + 30)));

        let ongoing = Fast {
            end_time: None,
            ..fast
        };
        assert_eq!(ongoing.duration(), None);
    }

    #[test]
    fn test_record_line_tagging() {
        let line: RecordLine = serde_json::from_str(
            r#"{"Glucose":{"timestamp":"2025-07-20T00:05:00Z","value":6.2}}"#,
        )
        .unwrap();
        match line {
            RecordLine::Glucose(reading) => assert_eq!(reading.value, 6.2),
            _ => panic!("Expected Glucose record"),
        }
    }
}

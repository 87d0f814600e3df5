// In-memory record store loaded from a dashboard data dump

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    day::DayWindow,
    errors::GlucodayError,
    records::{BasalEntry, BolusDose, Fast, FoodLog, GlucoseReading, Note, RecordLine, Workout},
};

use super::RecordSource;

/// Every record known to the dashboard. Serialized as the single JSON
/// document the dashboard exports (`glucoseData.json`).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordStore {
    pub glucose_readings: Vec<GlucoseReading>,
    #[serde(alias = "bolusDoses")]
    pub boluses: Vec<BolusDose>,
    pub basal_entries: Vec<BasalEntry>,
    pub pump_upload_time: Option<DateTime<Utc>>,
    pub notes: Vec<Note>,
    pub food_logs: Vec<FoodLog>,
    pub fasts: Vec<Fast>,
    pub workouts: Vec<Workout>,
}

impl RecordStore {
    /// Load a `.json` dump document or a `.jsonl` file with one tagged record
    /// per line.
    pub fn from_file(path: &PathBuf) -> Result<Self, GlucodayError> {
        if !path.is_file() {
            return Err(GlucodayError::InvalidDataFile {
                path: format!("{:?}", path),
            });
        }

        let store = match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") => Self::from_json_lines(path)?,
            _ => {
                let file =
                    File::open(path).map_err(|e| GlucodayError::DataFileIOError { source: e })?;
                serde_json::from_reader(BufReader::new(file))
                    .map_err(|e| GlucodayError::DataFileParseError { source: e })?
            }
        };
        info!(
            "Loaded {:?}: {} glucose readings, {} boluses, {} basal entries, {} notes, {} food logs, {} workouts, {} fasts",
            path,
            store.glucose_readings.len(),
            store.boluses.len(),
            store.basal_entries.len(),
            store.notes.len(),
            store.food_logs.len(),
            store.workouts.len(),
            store.fasts.len()
        );
        Ok(store)
    }

    fn from_json_lines(path: &Path) -> Result<Self, GlucodayError> {
        let lines = serde_jsonlines::json_lines(path)
            .map_err(|e| GlucodayError::DataFileIOError { source: e })?
            .collect::<Result<Vec<RecordLine>, std::io::Error>>()
            .map_err(|e| GlucodayError::DataFileIOError { source: e })?;

        let mut store = RecordStore::default();
        for line in lines {
            store.push(line);
        }
        Ok(store)
    }

    pub fn push(&mut self, line: RecordLine) {
        match line {
            RecordLine::Glucose(reading) => self.glucose_readings.push(reading),
            RecordLine::Basal(entry) => self.basal_entries.push(entry),
            RecordLine::Bolus(dose) => self.boluses.push(dose),
            RecordLine::Food(log) => self.food_logs.push(log),
            RecordLine::Note(note) => self.notes.push(note),
            RecordLine::Workout(workout) => self.workouts.push(workout),
            RecordLine::Fast(fast) => self.fasts.push(fast),
            // The most recent upload wins
            RecordLine::PumpUpload(uploaded) => {
                self.pump_upload_time = self.pump_upload_time.max(Some(uploaded))
            }
        }
    }
}

fn within_day<T: Clone>(
    records: &[T],
    day: &DayWindow,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut found: Vec<T> = records
        .iter()
        .filter(|record| day.contains(timestamp(*record)))
        .cloned()
        .collect();
    found.sort_by_key(|record| timestamp(record));
    found
}

fn overlapping_day<T: Clone>(
    records: &[T],
    day: &DayWindow,
    interval: impl Fn(&T) -> (DateTime<Utc>, Option<DateTime<Utc>>),
) -> Vec<T> {
    let mut found: Vec<T> = records
        .iter()
        .filter(|record| {
            let (start, end) = interval(*record);
            day.overlaps(start, end)
        })
        .cloned()
        .collect();
    found.sort_by_key(|record| interval(record).0);
    found
}

#[async_trait]
impl RecordSource for RecordStore {
    async fn glucose_readings(&self, day: &DayWindow) -> Result<Vec<GlucoseReading>, GlucodayError> {
        Ok(within_day(&self.glucose_readings, day, |r| r.timestamp))
    }

    async fn boluses(&self, day: &DayWindow) -> Result<Vec<BolusDose>, GlucodayError> {
        Ok(within_day(&self.boluses, day, |b| b.timestamp))
    }

    async fn basal_entries(&self, day: &DayWindow) -> Result<Vec<BasalEntry>, GlucodayError> {
        let entries = overlapping_day(&self.basal_entries, day, |e| (e.start_time, e.end_time));
        debug!("{} basal entries overlap {}", entries.len(), day.date);
        Ok(entries)
    }

    async fn pump_upload_time(&self) -> Result<Option<DateTime<Utc>>, GlucodayError> {
        Ok(self.pump_upload_time)
    }

    async fn notes(&self, day: &DayWindow) -> Result<Vec<Note>, GlucodayError> {
        Ok(within_day(&self.notes, day, |n| n.timestamp))
    }

    async fn food_logs(&self, day: &DayWindow) -> Result<Vec<FoodLog>, GlucodayError> {
        Ok(within_day(&self.food_logs, day, |f| f.timestamp))
    }

    async fn fasts(&self, day: &DayWindow) -> Result<Vec<Fast>, GlucodayError> {
        Ok(overlapping_day(&self.fasts, day, |f| (f.start_time, f.end_time)))
    }

    async fn workouts(&self, day: &DayWindow) -> Result<Vec<Workout>, GlucodayError> {
        Ok(overlapping_day(&self.workouts, day, |w| (w.start, w.end_time)))
    }
}

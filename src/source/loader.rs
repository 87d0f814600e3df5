use chrono::{DateTime, Utc};
use log::{error, info};

use crate::{
    analysis::basal::finalize_for_day,
    day::DayWindow,
    errors::GlucodayError,
    records::{BasalEntry, BolusDose, Fast, FoodLog, GlucoseReading, Note, Workout},
};

use super::RecordSource;

/// Result of fetching one entity for the day.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome<T> {
    Loaded(T),
    Failed { reason: String },
}

impl<T> FetchOutcome<T> {
    fn from_result(entity: &str, result: Result<T, GlucodayError>) -> Self {
        match result {
            Ok(data) => FetchOutcome::Loaded(data),
            Err(e) => {
                error!("Loading {} failed: {}", entity, e);
                FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

impl<T> FetchOutcome<Vec<T>> {
    /// Loaded records, or none when the fetch failed.
    pub fn records(&self) -> &[T] {
        match self {
            FetchOutcome::Loaded(records) => records,
            FetchOutcome::Failed { .. } => &[],
        }
    }
}

/// Everything fetched for one day, one outcome per entity.
#[derive(Clone, Debug)]
pub struct DaySnapshot {
    pub day: DayWindow,
    pub glucose: FetchOutcome<Vec<GlucoseReading>>,
    pub boluses: FetchOutcome<Vec<BolusDose>>,
    /// Entries already clipped to the day and closed at the pump upload time
    pub basal: FetchOutcome<Vec<BasalEntry>>,
    pub pump_upload_time: Option<DateTime<Utc>>,
    pub notes: FetchOutcome<Vec<Note>>,
    pub food_logs: FetchOutcome<Vec<FoodLog>>,
    pub fasts: FetchOutcome<Vec<Fast>>,
    pub workouts: FetchOutcome<Vec<Workout>>,
}

impl DaySnapshot {
    /// Names of the entities whose fetch failed.
    pub fn failures(&self) -> Vec<&'static str> {
        [
            ("glucose", self.glucose.is_failed()),
            ("boluses", self.boluses.is_failed()),
            ("basal", self.basal.is_failed()),
            ("notes", self.notes.is_failed()),
            ("food logs", self.food_logs.is_failed()),
            ("fasts", self.fasts.is_failed()),
            ("workouts", self.workouts.is_failed()),
        ]
        .into_iter()
        .filter_map(|(entity, failed)| failed.then_some(entity))
        .collect()
    }
}

async fn load_basal(
    source: &dyn RecordSource,
    day: &DayWindow,
) -> Result<(Vec<BasalEntry>, Option<DateTime<Utc>>), GlucodayError> {
    let (entries, pump_upload_time) =
        tokio::join!(source.basal_entries(day), source.pump_upload_time());
    let pump_upload_time = pump_upload_time?;
    if let Some(uploaded) = pump_upload_time {
        info!(
            "Pump upload time: {}",
            uploaded.with_timezone(&day.timezone).format("%-d %B %H:%M")
        );
    }
    Ok((finalize_for_day(entries?, day, pump_upload_time), pump_upload_time))
}

/// Fetch every entity for `day` concurrently. A failing fetch is logged and
/// leaves that entity empty without affecting the others.
pub async fn load_day(source: &dyn RecordSource, day: DayWindow) -> DaySnapshot {
    let (glucose, boluses, basal, notes, food_logs, fasts, workouts) = tokio::join!(
        source.glucose_readings(&day),
        source.boluses(&day),
        load_basal(source, &day),
        source.notes(&day),
        source.food_logs(&day),
        source.fasts(&day),
        source.workouts(&day),
    );

    let (basal, pump_upload_time) = match FetchOutcome::from_result("basal", basal) {
        FetchOutcome::Loaded((entries, uploaded)) => (FetchOutcome::Loaded(entries), uploaded),
        FetchOutcome::Failed { reason } => (FetchOutcome::Failed { reason }, None),
    };

    let snapshot = DaySnapshot {
        day,
        glucose: FetchOutcome::from_result("glucose", glucose),
        boluses: FetchOutcome::from_result("boluses", boluses),
        basal,
        pump_upload_time,
        notes: FetchOutcome::from_result("notes", notes),
        food_logs: FetchOutcome::from_result("food logs", food_logs),
        fasts: FetchOutcome::from_result("fasts", fasts),
        workouts: FetchOutcome::from_result("workouts", workouts),
    };
    info!(
        "Loaded {}: {} glucose readings, {} boluses, {} basal entries, {} notes",
        day.date,
        snapshot.glucose.records().len(),
        snapshot.boluses.records().len(),
        snapshot.basal.records().len(),
        snapshot.notes.records().len()
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    fn day() -> DayWindow {
        DayWindow::parse("2025-07-20", chrono_tz::UTC).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 20, hour, 0, 0).unwrap()
    }

    fn store() -> RecordStore {
        RecordStore {
            glucose_readings: vec![
                GlucoseReading::new(at(1), 5.),
                GlucoseReading::new(at(2), 6.),
            ],
            boluses: vec![BolusDose::new(at(8), 2.)],
            basal_entries: vec![
                BasalEntry::new(at(0) - Duration::hours(2), Some(at(6)), 0.8),
                BasalEntry::new(at(6), None, 0.9),
            ],
            pump_upload_time: Some(at(15)),
            ..Default::default()
        }
    }

    /// Delegates to a store but fails glucose and pump queries.
    struct FlakySource(RecordStore);

    #[async_trait]
    impl RecordSource for FlakySource {
        async fn glucose_readings(
            &self,
            _day: &DayWindow,
        ) -> Result<Vec<GlucoseReading>, GlucodayError> {
            Err(GlucodayError::FetchError {
                entity: "glucose".to_string(),
                reason: "connection reset".to_string(),
            })
        }
        async fn boluses(&self, day: &DayWindow) -> Result<Vec<BolusDose>, GlucodayError> {
            self.0.boluses(day).await
        }
        async fn basal_entries(&self, day: &DayWindow) -> Result<Vec<BasalEntry>, GlucodayError> {
            self.0.basal_entries(day).await
        }
        async fn pump_upload_time(&self) -> Result<Option<DateTime<Utc>>, GlucodayError> {
            Err(GlucodayError::FetchError {
                entity: "settings".to_string(),
                reason: "timeout".to_string(),
            })
        }
        async fn notes(&self, day: &DayWindow) -> Result<Vec<Note>, GlucodayError> {
            self.0.notes(day).await
        }
        async fn food_logs(&self, day: &DayWindow) -> Result<Vec<FoodLog>, GlucodayError> {
            self.0.food_logs(day).await
        }
        async fn fasts(&self, day: &DayWindow) -> Result<Vec<Fast>, GlucodayError> {
            self.0.fasts(day).await
        }
        async fn workouts(&self, day: &DayWindow) -> Result<Vec<Workout>, GlucodayError> {
            self.0.workouts(day).await
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_load_day_finalizes_basal() {
        let snapshot = block_on(load_day(&store(), day()));
        assert!(snapshot.failures().is_empty());
        assert_eq!(snapshot.glucose.records().len(), 2);
        assert_eq!(snapshot.pump_upload_time, Some(at(15)));

        let basal = snapshot.basal.records();
        assert_eq!(basal.len(), 2);
        assert_eq!(basal[0].start_time, day().start);
        assert_eq!(basal[1].end_time, Some(at(15)));
    }

    #[test]
    fn test_failed_fetches_do_not_block_others() {
        let snapshot = block_on(load_day(&FlakySource(store()), day()));
        assert_eq!(snapshot.failures(), vec!["glucose", "basal"]);
        assert!(snapshot.glucose.records().is_empty());
        assert!(snapshot.basal.records().is_empty());
        assert_eq!(snapshot.boluses.records().len(), 1);
        match &snapshot.glucose {
            FetchOutcome::Failed { reason } => assert!(reason.contains("connection reset")),
            _ => panic!("Expected glucose fetch to fail"),
        }
    }
}

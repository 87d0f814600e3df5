// Record sources and the concurrent per-day loader

pub mod loader;
pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    day::DayWindow,
    errors::GlucodayError,
    records::{BasalEntry, BolusDose, Fast, FoodLog, GlucoseReading, Note, Workout},
};

pub use loader::{DaySnapshot, FetchOutcome, load_day};
pub use store::RecordStore;

/// Per-entity queries for a single local day.
///
/// Interval records (basal, fasts, workouts) are returned when they overlap
/// the day at all; point records only when they fall inside it.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn glucose_readings(&self, day: &DayWindow) -> Result<Vec<GlucoseReading>, GlucodayError>;

    async fn boluses(&self, day: &DayWindow) -> Result<Vec<BolusDose>, GlucodayError>;

    async fn basal_entries(&self, day: &DayWindow) -> Result<Vec<BasalEntry>, GlucodayError>;

    /// Last time the insulin pump synced, used to close running basal entries.
    async fn pump_upload_time(&self) -> Result<Option<DateTime<Utc>>, GlucodayError>;

    async fn notes(&self, day: &DayWindow) -> Result<Vec<Note>, GlucodayError>;

    async fn food_logs(&self, day: &DayWindow) -> Result<Vec<FoodLog>, GlucodayError>;

    async fn fasts(&self, day: &DayWindow) -> Result<Vec<Fast>, GlucodayError>;

    async fn workouts(&self, day: &DayWindow) -> Result<Vec<Workout>, GlucodayError>;
}

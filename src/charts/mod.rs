// Chart-ready series for one day. Every series shares the day's time axis so
// the rendering layer can draw them stacked and move one cursor across all.

pub mod cursor;
pub mod series;
pub mod zones;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{analysis::SegmentPoint, day::DayWindow};

pub use cursor::{ChartId, CursorHighlight, CursorSync};
pub use zones::{AxisBounds, GlucoseZone};

/// Anything drawn at a position on the shared time axis.
pub trait TimePoint {
    fn x(&self) -> DateTime<Utc>;

    /// Whether the cursor may land on this point.
    fn is_highlightable(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BolusBar {
    pub x: DateTime<Utc>,
    pub y: f64,
    pub notes: Option<String>,
    pub source: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    Bolus,
    Note,
    Workout,
}

/// An icon placed on the glucose chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub x: DateTime<Utc>,
    pub y: f64,
    pub kind: MarkerKind,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPoint {
    pub x: DateTime<Utc>,
    /// Net carbs in grams
    pub y: f64,
    pub food_name: String,
    pub calories: f64,
    pub fat: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDetails {
    pub segment_start: DateTime<Utc>,
    pub segment_end: DateTime<Utc>,
    pub name: String,
    pub workout_type: String,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub active_calories: f64,
    pub average_heart_rate: f64,
    pub max_heart_rate: f64,
    /// Moving time in seconds
    pub duration: f64,
    /// Wall clock time in seconds
    pub elapsed_time: f64,
    /// Meters
    pub distance: f64,
    pub km_per_hour: f64,
    pub minutes_per_km: f64,
    pub tags: Vec<String>,
}

/// A point of the workout heart-rate step chart. Points without a `y` break
/// the line between two workouts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkoutStep {
    pub x: DateTime<Utc>,
    pub y: Option<f64>,
    #[serde(flatten)]
    pub details: Option<WorkoutDetails>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FastLabel {
    StartedAndEnded,
    Started,
    Ended,
    Continued,
}

impl FastLabel {
    pub fn text(&self) -> &'static str {
        match self {
            FastLabel::StartedAndEnded => "Started and ended",
            FastLabel::Started => "Started fast",
            FastLabel::Ended => "Ended fast",
            FastLabel::Continued => "Continued",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FastSpan {
    pub start: DateTime<Utc>,
    /// `None` while the fast is ongoing
    pub end: Option<DateTime<Utc>>,
    pub label: FastLabel,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

impl TimePoint for LinePoint {
    fn x(&self) -> DateTime<Utc> {
        self.x
    }
}

impl TimePoint for BolusBar {
    fn x(&self) -> DateTime<Utc> {
        self.x
    }
}

impl TimePoint for Marker {
    fn x(&self) -> DateTime<Utc> {
        self.x
    }
}

impl TimePoint for FoodPoint {
    fn x(&self) -> DateTime<Utc> {
        self.x
    }
}

impl TimePoint for WorkoutStep {
    fn x(&self) -> DateTime<Utc> {
        self.x
    }

    // Gap points only break the line
    fn is_highlightable(&self) -> bool {
        self.y.is_some()
    }
}

impl TimePoint for SegmentPoint {
    fn x(&self) -> DateTime<Utc> {
        self.x
    }
}

/// Everything the rendering layer needs to draw one day.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCharts {
    pub day: DayWindow,
    pub glucose: Vec<LinePoint>,
    pub glucose_axis: AxisBounds,
    pub glucose_zones: Vec<GlucoseZone>,
    pub note_markers: Vec<Marker>,
    pub bolus_markers: Vec<Marker>,
    pub workout_markers: Vec<Marker>,
    pub boluses: Vec<BolusBar>,
    pub basal: Vec<SegmentPoint>,
    pub food: Vec<FoodPoint>,
    pub food_axis: AxisBounds,
    pub workouts: Vec<WorkoutStep>,
    pub workout_axis: AxisBounds,
    pub fasts: Vec<FastSpan>,
}

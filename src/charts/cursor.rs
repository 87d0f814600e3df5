use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{DayCharts, TimePoint};

/// Points further than this from the cursor are not highlighted.
pub const DEFAULT_CURSOR_TOLERANCE_MINUTES: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartId {
    Glucose,
    Food,
    Bolus,
    Basal,
    Workout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorHighlight {
    pub chart: ChartId,
    pub index: usize,
}

/// Position of the shared vertical cursor and the point it highlights in
/// each chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CursorSync {
    pub at: DateTime<Utc>,
    pub highlights: Vec<CursorHighlight>,
}

/// Index of the highlightable point closest to `at`, if it is strictly
/// within `tolerance`.
pub fn nearest_point_index<P: TimePoint>(
    points: &[P],
    at: DateTime<Utc>,
    tolerance: Duration,
) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| point.is_highlightable())
        .min_by_key(|(_, point)| (point.x() - at).abs())
        .filter(|(_, point)| (point.x() - at).abs() < tolerance)
        .map(|(index, _)| index)
}

impl CursorSync {
    /// Move the cursor to `at` across every chart of the day. The basal chart
    /// only gets the line, its step points are too sparse to highlight.
    pub fn at(charts: &DayCharts, at: DateTime<Utc>, tolerance: Duration) -> Self {
        let candidates = [
            (
                ChartId::Glucose,
                nearest_point_index(&charts.glucose, at, tolerance),
            ),
            (ChartId::Food, nearest_point_index(&charts.food, at, tolerance)),
            (
                ChartId::Bolus,
                nearest_point_index(&charts.boluses, at, tolerance),
            ),
            (
                ChartId::Workout,
                nearest_point_index(&charts.workouts, at, tolerance),
            ),
        ];
        Self {
            at,
            highlights: candidates
                .into_iter()
                .filter_map(|(chart, index)| index.map(|index| CursorHighlight { chart, index }))
                .collect(),
        }
    }
}

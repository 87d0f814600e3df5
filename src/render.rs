// Turns one loaded day into chart series and a summary

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::{
    analysis::{
        BasalSegmentBuilder, DaySummary, GlucoseRangeAggregator,
        basal::segment_points,
        glucose::readings_for_day,
    },
    charts::{
        DayCharts,
        series::{
            bolus_bars, bolus_markers, fast_spans, food_points, glucose_line, note_markers,
            workout_markers, workout_steps,
        },
        zones::{food_axis, glucose_axis, glucose_zones, workout_axis},
    },
    day::{DayNavigation, DayWindow},
    logs::DayLogs,
    source::DaySnapshot,
};

/// The state a single render works from: the selected day and the records
/// fetched for it. Nothing is shared between renders.
pub struct RenderContext {
    pub day: DayWindow,
    pub snapshot: DaySnapshot,
    /// Wall clock the navigation state is computed against
    pub now: DateTime<Utc>,
}

/// Output of one render.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDay {
    pub charts: DayCharts,
    pub summary: DaySummary,
    pub logs: DayLogs,
    pub navigation: DayNavigation,
    /// Entities that could not be loaded and are drawn empty
    pub unavailable: Vec<&'static str>,
}

impl RenderContext {
    pub fn new(snapshot: DaySnapshot) -> Self {
        Self {
            day: snapshot.day,
            snapshot,
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn render(&self) -> RenderedDay {
        let day = &self.day;
        let snapshot = &self.snapshot;

        let unavailable = snapshot.failures();
        if !unavailable.is_empty() {
            warn!(
                "Rendering {} without: {}",
                day.date,
                unavailable.join(", ")
            );
        }

        let readings = readings_for_day(snapshot.glucose.records(), day);
        let boluses = snapshot.boluses.records();
        let notes = snapshot.notes.records();
        let food_logs = snapshot.food_logs.records();
        let workouts = snapshot.workouts.records();

        // Open entries were already closed at the pump upload time while loading
        let basal_segments = BasalSegmentBuilder::new(*day)
            .close_open_entries_at(snapshot.pump_upload_time)
            .build(snapshot.basal.records());
        let time_in_range = GlucoseRangeAggregator::new(*day).aggregate(&readings);

        let glucose_axis = glucose_axis(readings.iter().map(|r| r.value));
        let food = food_points(day, food_logs);
        let workout_steps = workout_steps(day, workouts);

        let charts = DayCharts {
            day: *day,
            glucose: glucose_line(&readings),
            glucose_axis,
            glucose_zones: glucose_zones(glucose_axis),
            note_markers: note_markers(day, notes, &readings),
            bolus_markers: bolus_markers(day, boluses, &readings),
            workout_markers: workout_markers(day, workouts),
            boluses: bolus_bars(day, boluses),
            basal: segment_points(&basal_segments),
            food_axis: food_axis(food.iter().map(|f| f.y)),
            food,
            workout_axis: workout_axis(workout_steps.iter().filter_map(|step| step.y)),
            workouts: workout_steps,
            fasts: fast_spans(day, snapshot.fasts.records()),
        };
        debug!(
            "Rendered {}: {} glucose points, {} basal points",
            day.date,
            charts.glucose.len(),
            charts.basal.len()
        );

        RenderedDay {
            summary: DaySummary::compute(day, boluses, &basal_segments, food_logs, time_in_range),
            logs: DayLogs::build(day, snapshot),
            navigation: DayNavigation::at(day, self.now),
            charts,
            unavailable,
        }
    }
}

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::analysis::glucose::{HIGH_THRESHOLD, LOW_THRESHOLD, VERY_HIGH_THRESHOLD};

const GLUCOSE_AXIS_MIN: f64 = 4.;
const GLUCOSE_AXIS_MAX: f64 = 10.;
const FOOD_AXIS_MAX_GRAMS: f64 = 40.;
const WORKOUT_AXIS_MIN_BPM: f64 = 90.;
const WORKOUT_AXIS_MAX_BPM: f64 = 150.;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneKind {
    Low,
    InRange,
    High,
    VeryHigh,
}

/// A horizontal band shaded behind the glucose line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseZone {
    pub kind: ZoneKind,
    pub y_min: f64,
    pub y_max: f64,
}

fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    match values.into_iter().minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Always shows 4 to 10, widened to whole numbers around the day's values.
pub fn glucose_axis(values: impl IntoIterator<Item = f64>) -> AxisBounds {
    let (min, max) = value_range(values).unwrap_or((GLUCOSE_AXIS_MIN, GLUCOSE_AXIS_MAX));
    AxisBounds {
        min: GLUCOSE_AXIS_MIN.min(min.floor()),
        max: GLUCOSE_AXIS_MAX.max(max.ceil()),
    }
}

/// Low, in-range, high and very-high bands. The top band reaches the axis.
pub fn glucose_zones(axis: AxisBounds) -> Vec<GlucoseZone> {
    vec![
        GlucoseZone {
            kind: ZoneKind::Low,
            y_min: 0.,
            y_max: LOW_THRESHOLD,
        },
        GlucoseZone {
            kind: ZoneKind::InRange,
            y_min: LOW_THRESHOLD,
            y_max: HIGH_THRESHOLD,
        },
        GlucoseZone {
            kind: ZoneKind::High,
            y_min: HIGH_THRESHOLD,
            y_max: VERY_HIGH_THRESHOLD,
        },
        GlucoseZone {
            kind: ZoneKind::VeryHigh,
            y_min: VERY_HIGH_THRESHOLD,
            y_max: axis.max,
        },
    ]
}

pub fn food_axis(net_carbs: impl IntoIterator<Item = f64>) -> AxisBounds {
    let max = net_carbs
        .into_iter()
        .map(f64::ceil)
        .fold(FOOD_AXIS_MAX_GRAMS, f64::max);
    AxisBounds { min: 0., max }
}

/// Heart rate axis, widened to the nearest ten around the day's averages.
pub fn workout_axis(average_heart_rates: impl IntoIterator<Item = f64>) -> AxisBounds {
    let (min, max) = value_range(average_heart_rates.into_iter().filter(|hr| *hr > 0.))
        .unwrap_or((WORKOUT_AXIS_MIN_BPM, WORKOUT_AXIS_MAX_BPM));
    AxisBounds {
        min: WORKOUT_AXIS_MIN_BPM.min((min / 10.).floor() * 10.),
        max: WORKOUT_AXIS_MAX_BPM.max((max / 10.).ceil() * 10.),
    }
}

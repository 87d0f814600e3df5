use serde::Serialize;

use crate::{
    day::DayWindow,
    records::{BolusDose, FoodLog},
};

use super::{
    basal::{BasalSegment, total_units},
    glucose::TimeInRange,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsulinSummary {
    pub total_bolus: f64,
    pub total_basal: f64,
    pub total_insulin: f64,
    /// Grams of net carbs per unit of bolus, when both are non-zero
    pub net_carbs_per_bolus_unit: Option<f64>,
    /// Grams of net carbs per unit of insulin, when any insulin was delivered
    pub net_carbs_per_insulin_unit: Option<f64>,
}

/// Grams, except calories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSummary {
    pub net_carbs: f64,
    pub total_carbs: f64,
    pub fat: f64,
    pub protein: f64,
    pub fibre: f64,
    pub calories: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub insulin: InsulinSummary,
    pub nutrition: NutritionSummary,
    pub glucose: TimeInRange,
}

impl NutritionSummary {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a FoodLog>) -> Self {
        logs.into_iter().fold(Self::default(), |mut total, log| {
            total.net_carbs += log.net_carbs;
            total.total_carbs += log.total_carbs;
            total.fat += log.fat;
            total.protein += log.protein;
            total.fibre += log.fibre;
            total.calories += log.calories;
            total
        })
    }
}

impl DaySummary {
    pub fn compute(
        day: &DayWindow,
        boluses: &[BolusDose],
        basal_segments: &[BasalSegment],
        food_logs: &[FoodLog],
        glucose: TimeInRange,
    ) -> Self {
        let nutrition =
            NutritionSummary::from_logs(food_logs.iter().filter(|log| day.contains(log.timestamp)));

        let total_bolus: f64 = boluses
            .iter()
            .filter(|dose| day.contains(dose.timestamp))
            .map(|dose| dose.amount)
            .sum();
        let total_basal = total_units(basal_segments);
        let total_insulin = total_bolus + total_basal;

        let net_carbs_per_bolus_unit = (nutrition.net_carbs > 0. && total_bolus > 0.)
            .then(|| nutrition.net_carbs / total_bolus);
        let net_carbs_per_insulin_unit =
            (total_insulin > 0.).then(|| nutrition.net_carbs / total_insulin);

        Self {
            insulin: InsulinSummary {
                total_bolus,
                total_basal,
                total_insulin,
                net_carbs_per_bolus_unit,
                net_carbs_per_insulin_unit,
            },
            nutrition,
            glucose,
        }
    }
}

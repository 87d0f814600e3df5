// Day-level computations: basal reconstruction, glucose time-in-range and
// the daily summary built from them.

pub mod basal;
pub mod glucose;
pub mod summary;

pub use basal::{BasalSegment, BasalSegmentBuilder, SegmentPoint};
pub use glucose::{GlucoseRangeAggregator, TimeInRange};
pub use summary::{DaySummary, InsulinSummary, NutritionSummary};

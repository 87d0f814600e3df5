// Library interface for glucoday
// This allows integration tests and benches to access internal modules

pub mod analysis;
pub mod charts;
pub mod config;
pub mod day;
pub mod errors;
pub mod format;
pub mod logs;
pub mod records;
pub mod render;
pub mod search;
pub mod source;
pub mod writer;

// Re-export commonly used types
pub use analysis::{BasalSegment, BasalSegmentBuilder, DaySummary, GlucoseRangeAggregator, TimeInRange};
pub use charts::{CursorSync, DayCharts};
pub use day::{DayNavigation, DayWindow};
pub use errors::GlucodayError;
pub use logs::DayLogs;
pub use render::{RenderContext, RenderedDay};
pub use source::{DaySnapshot, FetchOutcome, RecordSource, RecordStore, load_day};

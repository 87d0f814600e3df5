use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::{day::DayWindow, records::BasalEntry};

/// A flat stretch of basal delivery inside the selected day.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasalSegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Units per hour, 0 for filler segments
    pub rate: f64,
    /// No delivery was recorded for this stretch
    pub is_filler: bool,
    /// The underlying entry had no end and no closing instant was known
    pub open_ended: bool,
    pub mode: Option<String>,
    pub notes: Option<String>,
}

/// One end of a flat chart step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPoint {
    pub x: DateTime<Utc>,
    pub y: f64,
    pub segment_start: DateTime<Utc>,
    pub segment_end: DateTime<Utc>,
}

impl BasalSegment {
    fn filler(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            rate: 0.,
            is_filler: true,
            open_ended: false,
            mode: None,
            notes: None,
        }
    }

    /// Insulin delivered over the segment.
    pub fn units(&self) -> f64 {
        let hours = (self.end - self.start).num_milliseconds() as f64 / 3_600_000.;
        self.rate * hours
    }

    /// The start-flat and end-flat points drawing this segment.
    pub fn points(&self) -> [SegmentPoint; 2] {
        let point = |x| SegmentPoint {
            x,
            y: self.rate,
            segment_start: self.start,
            segment_end: self.end,
        };
        [point(self.start), point(self.end)]
    }
}

/// An entry after closing and clipping to the day.
struct ClippedEntry<'a> {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    open_ended: bool,
    entry: &'a BasalEntry,
}

/// Builds a gap-free sequence of flat basal segments covering a whole day.
pub struct BasalSegmentBuilder {
    day: DayWindow,
    close_at: Option<DateTime<Utc>>,
}

impl BasalSegmentBuilder {
    pub fn new(day: DayWindow) -> Self {
        Self {
            day,
            close_at: None,
        }
    }

    /// Instant used as the end of entries that are still running.
    pub fn close_open_entries_at(mut self, close_at: Option<DateTime<Utc>>) -> Self {
        self.close_at = close_at;
        self
    }

    pub fn build(&self, entries: &[BasalEntry]) -> Vec<BasalSegment> {
        let day_start = self.day.start;
        let day_end = self.day.end;

        let clipped = entries
            .iter()
            .filter(|entry| self.day.overlaps(entry.start_time, entry.end_time))
            .filter_map(|entry| {
                let effective_end = entry.end_time.or(self.close_at);
                let start = entry.start_time.max(day_start);
                let end = effective_end.map_or(day_end, |end| end.min(day_end));
                (start < end).then_some(ClippedEntry {
                    start,
                    end,
                    open_ended: effective_end.is_none(),
                    entry,
                })
            })
            .sorted_by_key(|clipped| clipped.start)
            .collect_vec();

        let mut segments = Vec::with_capacity(clipped.len() * 2 + 1);
        let mut last_end = day_start;
        for clipped in clipped {
            // An entry overlapping the previous one only keeps the part after it.
            let start = clipped.start.max(last_end);
            if start >= clipped.end {
                debug!(
                    "Skipping basal entry starting {} fully covered by earlier entries",
                    clipped.entry.start_time
                );
                continue;
            }
            if start > last_end {
                segments.push(BasalSegment::filler(last_end, start));
            }
            segments.push(BasalSegment {
                start,
                end: clipped.end,
                rate: clipped.entry.rate,
                is_filler: false,
                open_ended: clipped.open_ended,
                mode: clipped.entry.mode.clone(),
                notes: clipped.entry.notes.clone(),
            });
            last_end = clipped.end;
        }
        if last_end < day_end {
            segments.push(BasalSegment::filler(last_end, day_end));
        }
        segments
    }
}

/// Chart points for a segment sequence, two per segment.
pub fn segment_points(segments: &[BasalSegment]) -> Vec<SegmentPoint> {
    segments.iter().flat_map(BasalSegment::points).collect()
}

pub fn total_units(segments: &[BasalSegment]) -> f64 {
    segments.iter().map(BasalSegment::units).sum()
}

/// Close running entries at the pump upload time and clip everything to the
/// day, dropping entries left without any time inside it. Entries that cannot
/// be closed keep `end_time == None`.
pub fn finalize_for_day(
    entries: Vec<BasalEntry>,
    day: &DayWindow,
    pump_upload_time: Option<DateTime<Utc>>,
) -> Vec<BasalEntry> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let real_end = entry.end_time.or(pump_upload_time);
            let start = entry.start_time.max(day.start);
            let end = real_end.map_or(day.end, |end| end.min(day.end));
            (start < end).then(|| BasalEntry {
                start_time: start,
                end_time: real_end.map(|_| end),
                ..entry
            })
        })
        .collect()
}

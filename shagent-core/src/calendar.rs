//! BusyCalendar: externally sourced busy intervals and free/busy queries.
//!
//! Intervals are half-open `[start, end)`. Overlapping intervals are kept as-is;
//! the calendar only answers overlap queries and never merges.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
}

impl BusyInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Strict half-open overlap: `max(s, start) < min(e, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start.max(start) < self.end.min(end)
    }

    fn is_well_formed(&self) -> bool {
        self.end > self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyCalendar {
    intervals: Vec<BusyInterval>,
}

impl BusyCalendar {
    /// Build a calendar, silently dropping zero-length or inverted intervals.
    pub fn new(intervals: impl IntoIterator<Item = BusyInterval>) -> Self {
        let mut kept: Vec<BusyInterval> = intervals
            .into_iter()
            .filter(|b| {
                let ok = b.is_well_formed();
                if !ok {
                    debug!(label = %b.label, start = %b.start, end = %b.end, "skipping malformed busy interval");
                }
                ok
            })
            .collect();
        kept.sort_by_key(|b| (b.start, b.end));
        Self { intervals: kept }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[BusyInterval] {
        &self.intervals
    }

    /// True iff no stored interval overlaps `[start, end)`.
    pub fn is_free(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        !self.intervals.iter().any(|b| b.overlaps(start, end))
    }

    /// Intervals overlapping `[start, end)`, in start order.
    pub fn conflicts(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&BusyInterval> {
        self.intervals
            .iter()
            .filter(|b| b.overlaps(start, end))
            .collect()
    }
}

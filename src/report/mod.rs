//! Everything derived from stored records: monthly views, salary estimates and csv export.
//! Nothing here is cached, views are recomputed from a fresh [RecordMap] snapshot whenever the
//! records or the selected month change.

pub mod csv;
pub mod month;
pub mod salary;
pub mod sink;

use std::cmp::Reverse;

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::storage::entities::{RecordMap, WorkRecord};

use month::MonthCursor;

/// Sorts records most recent first. Records with keys that aren't dates go last.
pub fn sort_descending(records: &mut [WorkRecord]) {
    records.sort_by_key(|record| Reverse(record.naive_date()));
}

/// Records of `month`, most recent first.
pub fn filter_month(records: &RecordMap, month: MonthCursor) -> Vec<WorkRecord> {
    let mut filtered = records
        .values()
        .filter(|record| match record.naive_date() {
            Some(date) => month.contains(date),
            None => {
                warn!("Skipping record with illegal date {:?}", record.date);
                false
            }
        })
        .cloned()
        .collect::<Vec<_>>();
    sort_descending(&mut filtered);
    filtered
}

pub fn month_total(records: &[WorkRecord]) -> u64 {
    records.iter().map(|record| record.total_minutes).sum()
}

/// A single bar of the daily hours chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub hours: f64,
}

impl DailyHours {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Chart series for already filtered records, in the same order. Empty input means there's
/// nothing to draw.
pub fn daily_hours(records: &[WorkRecord]) -> Vec<DailyHours> {
    records
        .iter()
        .filter_map(|record| {
            Some(DailyHours {
                date: record.naive_date()?,
                hours: record.total_hours(),
            })
        })
        .collect()
}

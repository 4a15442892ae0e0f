use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::calculate_minutes;

/// Everything stored by [RecordStore](super::record_store::RecordStore), keyed by date key.
pub type RecordMap = BTreeMap<String, WorkRecord>;

/// The struct used for storing a worked day. There's at most one per calendar date, `date` being
/// both its identity and its key in [RecordMap]. Field names are kept camelCase on disk.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    pub date: String,
    pub in_time: DateTime<Utc>,
    pub out_time: DateTime<Utc>,
    /// Redundant with the timestamps. Computed once on write and never re-validated on read.
    pub total_minutes: u64,
}

impl WorkRecord {
    pub fn new<Tz: TimeZone>(
        date: impl Into<String>,
        in_time: &DateTime<Tz>,
        out_time: &DateTime<Tz>,
    ) -> Self {
        Self {
            date: date.into(),
            in_time: in_time.to_utc(),
            out_time: out_time.to_utc(),
            total_minutes: calculate_minutes(Some(in_time), Some(out_time)),
        }
    }

    /// Calendar date the record belongs to. [None] if the key isn't `YYYY-MM-DD`, which can only
    /// happen for data written by something other than shiftlog.
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.
    }
}

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::TimeZone;
use tracing::{info, instrument, warn};

use crate::storage::{entities::WorkRecord, kv::KeyValueStore, record_store::RecordStore};

use super::{sink::ShareSink, sort_descending};

pub const EXPORT_FILE_NAME: &str = "office_hours_history.csv";

const HEADER: &str = "Date,In Time,Out Time,Total Minutes,Total Hours";

#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// There are no records. Nothing was written.
    NothingToExport,
    /// The file was written but the sink can't share it.
    SinkUnavailable(PathBuf),
    Shared(PathBuf),
}

/// Serializes records as they are ordered. Times are rendered in `tz`. Fields are never quoted,
/// none of them can contain a comma.
pub fn records_to_csv<Tz>(records: &[WorkRecord], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut content = String::new();
    content.push_str(HEADER);
    content.push('\n');

    for record in records {
        content.push_str(&format!(
            "{},{},{},{},{:.2}\n",
            record.date,
            record.in_time.with_timezone(tz).format("%H:%M:%S"),
            record.out_time.with_timezone(tz).format("%H:%M:%S"),
            record.total_minutes,
            record.total_hours(),
        ));
    }
    content
}

/// Exports every stored record, most recent first, and hands the file to `sink`.
#[instrument(skip_all)]
pub async fn export_to_csv<K, S, Tz>(
    store: &RecordStore<K>,
    sink: &S,
    tz: &Tz,
) -> Result<ExportOutcome>
where
    K: KeyValueStore,
    S: ShareSink + ?Sized,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut records = store.get_all_records().await.into_values().collect::<Vec<_>>();
    if records.is_empty() {
        info!("No records to export");
        return Ok(ExportOutcome::NothingToExport);
    }
    sort_descending(&mut records);

    let content = records_to_csv(&records, tz);
    let path = sink.write(EXPORT_FILE_NAME, &content).await?;

    if !sink.is_available().await {
        warn!("Sharing is not available");
        return Ok(ExportOutcome::SinkUnavailable(path));
    }
    sink.share(&path).await?;
    Ok(ExportOutcome::Shared(path))
}

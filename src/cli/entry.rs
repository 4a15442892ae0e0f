use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use now::DateTimeNow;
use thiserror::Error;
use tracing::info;

use crate::{
    storage::{entities::WorkRecord, kv::KeyValueStore, record_store::RecordStore},
    utils::{
        clock::{greeting, Clock},
        time::{calculate_minutes, format_date_key, format_duration},
    },
};

use super::{parse_day, parse_moment, DateStyle};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("Out Time must be after In Time.")]
    OutNotAfterIn,
}

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(
        long,
        help = "Day the entry belongs to. Examples are \"today\", \"yesterday\", \"2024-03-01\", \"15/03/2024\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(
        long = "in",
        help = "Punch in time, relative to --date. Examples are \"9:00\", \"9am\", \"08:30 14/03/2024\". Defaults to now"
    )]
    in_time: Option<String>,
    #[arg(
        long = "out",
        help = "Punch out time, relative to --date. Examples are \"17:30\", \"6pm\". Defaults to now"
    )]
    out_time: Option<String>,
}

/// Builds the record for `date` out of punch times. A record is only valid when the punch out
/// happens at least a whole minute after the punch in.
pub fn build_entry(
    date: &DateTime<Local>,
    in_time: &DateTime<Local>,
    out_time: &DateTime<Local>,
) -> Result<WorkRecord, EntryError> {
    if calculate_minutes(Some(in_time), Some(out_time)) == 0 {
        return Err(EntryError::OutNotAfterIn);
    }
    Ok(WorkRecord::new(format_date_key(date), in_time, out_time))
}

/// Command to process `log` command. Saves one entry, replacing whatever was logged for that
/// day before.
pub async fn process_log_command(
    LogCommand {
        date,
        in_time,
        out_time,
    }: LogCommand,
    date_style: DateStyle,
    store: &RecordStore<impl KeyValueStore>,
    clock: &dyn Clock,
) -> Result<()> {
    let now = clock.now();
    println!("{},", greeting(&now));

    let date = match date {
        Some(text) => parse_day(&text, now, date_style)?,
        None => now,
    };
    let day_start = date.beginning_of_day();
    let in_time = match in_time {
        Some(text) => parse_moment(&text, day_start, date_style)?,
        None => now,
    };
    let out_time = match out_time {
        Some(text) => parse_moment(&text, day_start, date_style)?,
        None => now,
    };

    let record = build_entry(&date, &in_time, &out_time)?;
    let date_key = record.date.clone();
    let duration = format_duration(record.total_minutes);
    info!("Logging {duration} for {date_key}");

    if !store.save_record(&date_key, record).await {
        return Err(anyhow!("Failed to save record."));
    }
    println!("Logged {duration} for {date_key}!");
    Ok(())
}

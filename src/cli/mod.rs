pub mod entry;
pub mod history;

use std::{fmt::Display, path::PathBuf};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use entry::{process_log_command, LogCommand};
use history::{process_history_command, process_salary_command, MonthSelection};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    report::{
        csv::{export_to_csv, ExportOutcome},
        sink::DirectorySink,
    },
    storage::{kv::FileKeyValueStore, kv::KeyValueStore, record_store::RecordStore},
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, create_dir},
        logging::enable_logging,
        time::format_date_key,
    },
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "Shiftlog", version, long_about = None)]
#[command(about = "Personal work hours tracker", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Log level. Defaults to RUST_LOG or debug")]
    log_filter: Option<LevelFilter>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Save worked time for a day, replacing what was saved for it before")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show records, daily hours and the total of a month")]
    History {
        #[command(flatten)]
        month: MonthSelection,
    },
    #[command(about = "Estimate the salary of a month using the saved hourly rate")]
    Salary {
        #[command(flatten)]
        month: MonthSelection,
        #[arg(long, default_value = "₹", help = "Currency symbol printed before the amount")]
        currency: String,
    },
    #[command(about = "Set the hourly rate. Prints the current one when no value is given")]
    Rate { value: Option<String> },
    #[command(about = "Delete the record of a single day")]
    Delete {
        #[arg(help = "Day to delete. Examples are \"2024-03-01\", \"yesterday\"")]
        date: String,
    },
    #[command(about = "Delete all records. The hourly rate is kept")]
    Clear {
        #[arg(long, help = "Confirm deleting all history. This cannot be undone")]
        yes: bool,
    },
    #[command(about = "Export all records as csv")]
    Export {
        #[arg(long, help = "Directory the exported file is shared into")]
        to: Option<PathBuf>,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };
    let logging_level = match (args.log_filter, args.log) {
        (Some(level), _) => Some(level),
        (None, true) => Some(LevelFilter::TRACE),
        (None, false) => None,
    };
    enable_logging(&app_dir.join("logs"), logging_level, args.log)?;

    let store = RecordStore::new(FileKeyValueStore::new(app_dir.join("store"))?);
    let clock = DefaultClock;
    info!("Using application directory {app_dir:?}");

    match args.commands {
        Commands::Log { command } => {
            process_log_command(command, args.date_style, &store, &clock).await
        }
        Commands::History { month } => process_history_command(month, &store, &clock).await,
        Commands::Salary { month, currency } => {
            process_salary_command(month, &currency, &store, &clock).await
        }
        Commands::Rate { value } => process_rate_command(value, &store).await,
        Commands::Delete { date } => {
            process_delete_command(&date, args.date_style, &store, &clock).await
        }
        Commands::Clear { yes } => process_clear_command(yes, &store).await,
        Commands::Export { to } => {
            let sink = DirectorySink::new(app_dir.join("exports"), to);
            process_export_command(&store, &sink).await
        }
    }
}

async fn process_rate_command(
    value: Option<String>,
    store: &RecordStore<impl KeyValueStore>,
) -> Result<()> {
    match value {
        Some(rate) => {
            if !store.save_hourly_rate(&rate).await {
                return Err(anyhow!("Failed to save rate."));
            }
            println!("Hourly rate set to {rate}");
        }
        None => {
            let rate = store.get_hourly_rate().await;
            if rate.is_empty() {
                println!("Hourly rate is not set");
            } else {
                println!("{rate}");
            }
        }
    }
    Ok(())
}

async fn process_delete_command(
    date: &str,
    date_style: DateStyle,
    store: &RecordStore<impl KeyValueStore>,
    clock: &dyn Clock,
) -> Result<()> {
    let date_key = format_date_key(&parse_day(date, clock.now(), date_style)?);
    if !store.delete_record(&date_key).await {
        return Err(anyhow!("Failed to delete record for {date_key}."));
    }
    println!("Deleted record for {date_key}");
    Ok(())
}

async fn process_clear_command(yes: bool, store: &RecordStore<impl KeyValueStore>) -> Result<()> {
    if !yes {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "Deleting all history cannot be undone. Pass --yes to confirm",
            )
            .into());
    }
    store.clear_all_data().await;
    println!("All records deleted");
    Ok(())
}

async fn process_export_command(
    store: &RecordStore<impl KeyValueStore>,
    sink: &DirectorySink,
) -> Result<()> {
    match export_to_csv(store, sink, &Local).await {
        Ok(ExportOutcome::NothingToExport) => println!("No records to export"),
        Ok(ExportOutcome::SinkUnavailable(path)) => {
            println!("Sharing is not available. Export written to {}", path.display())
        }
        Ok(ExportOutcome::Shared(path)) => println!("Exported {}", path.display()),
        Err(e) => return Err(e.context("Failed to export data.")),
    }
    Ok(())
}

fn to_local(naive: NaiveDateTime) -> Result<DateTime<Local>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("{naive} doesn't exist in local time"))
}

fn validation_error(message: String) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}

/// Parses a day. `YYYY-MM-DD` is always accepted, anything else goes through
/// [chrono_english]. The result is noon of that day, so it is never affected by DST gaps.
pub fn parse_day(
    text: &str,
    now: DateTime<Local>,
    date_style: DateStyle,
) -> Result<DateTime<Local>> {
    let date = match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => parse_date_string(text, now, date_style.into())
            .map_err(|e| validation_error(format!("Failed to validate date {text}: {e}")))?
            .date_naive(),
    };
    to_local(date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)))
}

/// Parses a moment in time. Bare times are placed on the day of `base`.
pub fn parse_moment(
    text: &str,
    base: DateTime<Local>,
    date_style: DateStyle,
) -> Result<DateTime<Local>> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return to_local(naive);
        }
    }
    for format in ["%H:%M", "%H:%M:%S"] {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return to_local(base.date_naive().and_time(time));
        }
    }
    let with_day = match date_style {
        DateStyle::Uk => ["%H:%M %d/%m/%Y", "%d/%m/%Y %H:%M"],
        DateStyle::Us => ["%H:%M %m/%d/%Y", "%m/%d/%Y %H:%M"],
    };
    for format in with_day {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return to_local(naive);
        }
    }
    parse_date_string(text, base, date_style.into())
        .map_err(|e| validation_error(format!("Failed to validate time {text}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{DateTime, Duration, Local, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        report::sink::DirectorySink,
        storage::{entities::WorkRecord, kv::MemoryKeyValueStore, record_store::RecordStore},
        utils::{clock::Clock, time::format_date_key},
    };

    use super::{
        parse_day, parse_moment, process_clear_command, process_delete_command,
        process_export_command, process_rate_command, DateStyle,
    };

    struct TestClock(DateTime<Local>);

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn store() -> RecordStore<Arc<MemoryKeyValueStore>> {
        RecordStore::new(Arc::new(MemoryKeyValueStore::new()))
    }

    async fn save_hour(store: &RecordStore<Arc<MemoryKeyValueStore>>, date_key: &str) {
        let start = Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        store
            .save_record(
                date_key,
                WorkRecord::new(date_key, &start, &(start + Duration::hours(1))),
            )
            .await;
    }

    #[test]
    fn test_parse_day_iso() -> Result<()> {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

        let day = parse_day("2024-02-29", now, DateStyle::Uk)?;

        assert_eq!(format_date_key(&day), "2024-02-29");
        assert!(parse_day("2024-02-30", now, DateStyle::Uk).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_moment_formats() -> Result<()> {
        let base = Local.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

        assert_eq!(
            parse_moment("09:15", base, DateStyle::Uk)?,
            Local.with_ymd_and_hms(2024, 3, 10, 9, 15, 0).unwrap()
        );
        assert_eq!(
            parse_moment("17:45:30", base, DateStyle::Uk)?,
            Local.with_ymd_and_hms(2024, 3, 10, 17, 45, 30).unwrap()
        );
        assert_eq!(
            parse_moment("2024-03-09 22:00", base, DateStyle::Uk)?,
            Local.with_ymd_and_hms(2024, 3, 9, 22, 0, 0).unwrap()
        );
        Ok(())
    }

    #[test]
    fn test_parse_moment_time_with_day() -> Result<()> {
        let base = Local.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let expected = Local.with_ymd_and_hms(2024, 3, 14, 8, 30, 0).unwrap();

        assert_eq!(parse_moment("08:30 14/03/2024", base, DateStyle::Uk)?, expected);
        assert_eq!(parse_moment("14/03/2024 08:30", base, DateStyle::Uk)?, expected);
        assert_eq!(parse_moment("08:30 03/14/2024", base, DateStyle::Us)?, expected);
        assert_eq!(parse_moment("03/14/2024 08:30", base, DateStyle::Us)?, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_rate_command() -> Result<()> {
        let store = store();

        process_rate_command(Some("150".into()), &store).await?;
        process_rate_command(None, &store).await?;

        assert_eq!(store.get_hourly_rate().await, "150");
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() -> Result<()> {
        let store = store();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        store
            .save_record(
                "2024-03-01",
                WorkRecord::new("2024-03-01", &start, &(start + Duration::hours(1))),
            )
            .await;

        assert!(process_clear_command(false, &store).await.is_err());
        assert_eq!(store.get_all_records().await.len(), 1);

        process_clear_command(true, &store).await?;
        assert!(store.get_all_records().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_command_removes_only_that_day() -> Result<()> {
        let store = store();
        let clock = TestClock(Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap());
        save_hour(&store, "2024-03-01").await;
        save_hour(&store, "2024-03-02").await;

        process_delete_command("2024-03-01", DateStyle::Uk, &store, &clock).await?;

        let records = store.get_all_records().await;
        assert_eq!(
            records.keys().cloned().collect::<Vec<_>>(),
            vec!["2024-03-02".to_owned()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_command_missing_day() -> Result<()> {
        let store = store();
        let clock = TestClock(Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap());
        save_hour(&store, "2024-03-02").await;
        let before = store.get_all_records().await;

        assert!(
            process_delete_command("2024-03-05", DateStyle::Uk, &store, &clock)
                .await
                .is_err()
        );
        assert_eq!(store.get_all_records().await, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_command_relative_day() -> Result<()> {
        let store = store();
        let clock = TestClock(Local.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap());
        save_hour(&store, "2024-03-01").await;
        save_hour(&store, "2024-03-02").await;

        process_delete_command("yesterday", DateStyle::Uk, &store, &clock).await?;

        let records = store.get_all_records().await;
        assert!(!records.contains_key("2024-03-01"));
        assert!(records.contains_key("2024-03-02"));
        Ok(())
    }

    #[tokio::test]
    async fn test_export_command_without_destination() -> Result<()> {
        let store = store();
        let dir = tempdir()?;
        let sink = DirectorySink::new(dir.path().to_owned(), None);

        process_export_command(&store, &sink).await?;
        assert!(std::fs::read_dir(dir.path())?.next().is_none());

        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        store
            .save_record(
                "2024-03-01",
                WorkRecord::new("2024-03-01", &start, &(start + Duration::hours(1))),
            )
            .await;
        process_export_command(&store, &sink).await?;
        assert!(dir.path().join("office_hours_history.csv").exists());
        Ok(())
    }
}

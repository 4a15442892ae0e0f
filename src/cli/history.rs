use anyhow::Result;
use chrono::{DateTime, Local};

use crate::{
    report::{
        daily_hours, filter_month, month::MonthCursor, month_total, salary::estimate_salary,
        DailyHours,
    },
    storage::{entities::WorkRecord, kv::KeyValueStore, record_store::RecordStore},
    utils::{clock::Clock, time::format_duration},
};

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct MonthSelection {
    #[arg(long, help = "Month in the format YYYY-MM. Defaults to the current month")]
    month: Option<MonthCursor>,
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Months to move from the selected month. -1 is the previous month"
    )]
    offset: i32,
}

impl MonthSelection {
    pub fn resolve(&self, now: &DateTime<Local>) -> MonthCursor {
        self.month
            .unwrap_or_else(|| MonthCursor::containing(now))
            .shift(self.offset)
    }
}

const MAX_BAR_WIDTH: f64 = 40.;

/// Text version of the daily hours chart. Bars are scaled to the longest day.
fn render_chart(series: &[DailyHours]) -> String {
    let mut output = String::new();
    let Some(max) = series.iter().map(|v| v.hours).reduce(f64::max) else {
        return output;
    };
    output.push_str("Daily Hours Summary\n");
    for entry in series {
        let width = if max > 0. {
            (entry.hours / max * MAX_BAR_WIDTH).round() as usize
        } else {
            0
        };
        output.push_str(&format!(
            "{:>2} {:<width$} {:.1}h\n",
            entry.day(),
            "#".repeat(width),
            entry.hours,
            width = MAX_BAR_WIDTH as usize
        ));
    }
    output
}

fn render_record(record: &WorkRecord) -> String {
    let date = record
        .naive_date()
        .map(|v| v.format("%a, %d %b").to_string())
        .unwrap_or_else(|| record.date.clone());
    format!(
        "{date}\t{}\tIn: {}\tOut: {}",
        format_duration(record.total_minutes),
        record.in_time.with_timezone(&Local).format("%H:%M"),
        record.out_time.with_timezone(&Local).format("%H:%M"),
    )
}

pub fn render_history(month: MonthCursor, records: &[WorkRecord]) -> String {
    let mut output = format!("{month}\n\n");
    output.push_str(&render_chart(&daily_hours(records)));
    output.push_str(&format!(
        "\nMonth Total\t{}\nDaily Records ({})\n",
        format_duration(month_total(records)),
        records.len()
    ));
    if records.is_empty() {
        output.push_str("No records found for this month.\n");
    }
    for record in records {
        output.push_str(&render_record(record));
        output.push('\n');
    }
    output
}

async fn history_report(
    selection: MonthSelection,
    store: &RecordStore<impl KeyValueStore>,
    clock: &dyn Clock,
) -> String {
    let month = selection.resolve(&clock.now());
    let records = filter_month(&store.get_all_records().await, month);
    render_history(month, &records)
}

/// Command to process `history` command. Shows the selected month, most recent days first.
pub async fn process_history_command(
    selection: MonthSelection,
    store: &RecordStore<impl KeyValueStore>,
    clock: &dyn Clock,
) -> Result<()> {
    print!("{}", history_report(selection, store, clock).await);
    Ok(())
}

/// Command to process `salary` command. The salary is only ever computed here, on request, from
/// whatever rate is saved at that moment.
pub async fn process_salary_command(
    selection: MonthSelection,
    currency: &str,
    store: &RecordStore<impl KeyValueStore>,
    clock: &dyn Clock,
) -> Result<()> {
    let month = selection.resolve(&clock.now());
    let total = month_total(&filter_month(&store.get_all_records().await, month));
    let salary = estimate_salary(&store.get_hourly_rate().await, total)?;

    println!("{month}");
    println!("Month Total\t{}", format_duration(total));
    println!("Estimated Salary\t{currency}{salary}");
    Ok(())
}

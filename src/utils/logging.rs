use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "shiftlog";
const KEPT_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "debug";

/// Directive for this crate's events. An explicit level wins over `RUST_LOG`. A `RUST_LOG` that
/// already names targets is used untouched.
fn filter_directive(log_level: Option<LevelFilter>, rust_log: Option<String>) -> String {
    let target = env!("CARGO_PKG_NAME").replace('-', "_");
    match (log_level, rust_log) {
        (Some(level), _) => format!("{target}={level}"),
        (None, Some(directive)) if directive.contains('=') => directive,
        (None, Some(level)) if !level.trim().is_empty() => format!("{target}={}", level.trim()),
        (None, _) => format!("{target}={DEFAULT_LEVEL}"),
    }
}

/// Logs into daily rotated files under `log_dir`, and to stdout when `show_std` is set.
pub fn enable_logging(
    log_dir: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let files = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)?;
    let stdout = std::io::stdout.with_filter(move |_| show_std);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(
            log_level,
            std::env::var("RUST_LOG").ok(),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(files))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

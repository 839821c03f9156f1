use anyhow::{Context, Result};
use std::{
    fs::{File, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "ODBCPROBE_LOG";
const DEFAULT_FILTER: &str = "odbcprobe=info";

/// Open the log file for appending, creating it if needed
///
/// # Errors
///
/// Returns an error if the file cannot be created or opened for writing
pub fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Subscriber writing every event to stderr and to `log_file`
///
/// Stdout is left to the `--json` report. Filter comes from `ODBCPROBE_LOG`,
/// `odbcprobe=info` when unset or invalid.
pub fn subscriber(log_file: File) -> impl Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
}

/// Install [`subscriber`] globally
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber is already set
pub fn init(log_file: &Path) -> Result<()> {
    let file = open_log_file(log_file)?;

    subscriber(file)
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}

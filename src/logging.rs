use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directory log files are written to
pub const LOG_DIR: &str = "logs";
/// Base name of the daily-rotated log file
pub const LOG_FILE: &str = "agent.log";

/// Initialize the logging system
/// Logs will be written to the logs/ directory only, so the console carries
/// nothing but the run's output
pub fn init_logging() -> Result<()> {
    init_logging_in(LOG_DIR)
}

/// Initialize logging into a specific directory
pub fn init_logging_in(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    // File appender - daily rotation
    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // Default to INFO level, can be overridden with RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Logging was already initialized")?;

    tracing::info!("Logging system initialized");
    tracing::info!("Log files location: {}", dir.join(LOG_FILE).display());

    Ok(())
}

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::APP_NAME;

/// Environment variable controlling the log filter, e.g.
/// `TUNEDASH_LOG=tunedash=trace`.
pub const LOG_ENV: &str = "TUNEDASH_LOG";

/// Default log file location: `<cache_dir>/tunedash/tunedash.log`.
pub fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| eyre!("Could not determine cache directory"))?
        .join(APP_NAME);
    Ok(dir.join(format!("{APP_NAME}.log")))
}

/// Initialize file logging. Only called when debug mode is on; the TUI owns
/// stdout/stderr, so nothing is ever written to the terminal.
///
/// Returns the path of the log file being written.
pub fn init() -> Result<PathBuf> {
    let log_path = default_log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Warn for dependencies, debug for the application itself.
    // TUNEDASH_LOG overrides.
    let env_filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy()
        .add_directive("tunedash=debug".parse()?);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Arc::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(log_path)
}

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. explicit level from the caller (CLI flag)
//! 2. `WEFT_LOG` environment variable (a level or a full `EnvFilter` directive)
//! 3. `log_level` from the config file
//! 4. default to `info`

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WEFT_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Pick the filter directive by priority.
fn select_directive(
    cli_level: Option<Level>,
    env_value: Option<String>,
    config_level: Option<&str>,
) -> String {
    if let Some(level) = cli_level {
        return level.as_str().to_lowercase();
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return value;
    }
    config_level
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("info")
        .to_string()
}

/// Build the `EnvFilter` the subscriber will use.
pub fn build_filter(
    cli_level: Option<Level>,
    config_level: Option<&str>,
) -> Result<EnvFilter, LoggingError> {
    let directive = select_directive(cli_level, std::env::var(LOG_ENV).ok(), config_level);
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        reason: e.to_string(),
        directive,
    })
}

/// Initialise the global logging subscriber.
///
/// Call once at startup.
pub fn init_logging(cli_level: Option<Level>, config_level: Option<&str>) -> Result<(), LoggingError> {
    let filter = build_filter(cli_level, config_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

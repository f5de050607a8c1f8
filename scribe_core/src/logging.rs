//! Structured logging with tracing.

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use crate::config::LoggingConfig;
use crate::{Error, Result};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SCRIBE_LOG";

/// Install the global subscriber, writing to stderr.
///
/// `SCRIBE_LOG` wins over the configured level when set.
///
/// # Errors
///
/// Returns [`Error::Config`] for an unknown level or when a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|err| Error::Config {
        path: LOG_ENV.to_owned(),
        message: err.to_string(),
    })
}

/// Parse log level string to tracing Level.
///
/// # Errors
///
/// Returns [`Error::Config`] for anything other than the five tracing levels.
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::Config {
            path: "logging.level".to_owned(),
            message: format!("invalid log level: {level}. Use trace, debug, info, warn, or error"),
        }),
    }
}

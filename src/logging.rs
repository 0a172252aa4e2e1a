//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level. Logs go to stderr, or are
//! appended to the configured file without colours.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{HarnessError, HarnessResult};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

fn filter(level: &str) -> HarnessResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| HarnessError::Logging(format!("invalid filter {level:?}: {e}")))
}

/// Install the global subscriber. Does nothing once one is installed.
///
/// # Errors
///
/// `HarnessError::Logging` when the filter does not parse or the log file
/// cannot be opened.
pub fn init(config: &LoggingConfig) -> HarnessResult<()> {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("subscriber already installed");
        return Ok(());
    }
    let filter = filter(&config.level)?;
    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    HarnessError::Logging(format!("cannot open {}: {e}", path.display()))
                })?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(config.file.is_none());
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|e| HarnessError::Logging(e.to_string()))
}

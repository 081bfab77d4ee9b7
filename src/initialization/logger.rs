//! Logger initialization.

use std::io::Write;

use crate::config::{LogFormat, LOG_TARGET};
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes `env_logger` with the given level and format.
///
/// `RUST_LOG` is read first, then `level` overrides it, so
/// `RUST_LOG=write_cache=trace` still works for quick debugging while the
/// CLI flag keeps control of the default. The MongoDB driver is capped at
/// `Warn`, its connection pool chatter drowns out the cache at debug level.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger was already set.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=write_cache=debug write_cache_bench --documents 50000
/// write_cache_bench --log-level debug --log-format json
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("mongodb", LevelFilter::Warn);
    builder.filter_module(LOG_TARGET, level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so a second call (tests, embedding apps) reports instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

//! Configuration types.
//!
//! This module defines the cache configuration struct along with the enums
//! used to select the write strategy and the log output.

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::constants::{
    DEFAULT_CACHE_SIZE, DEFAULT_FLUSH_TIME, DEFAULT_RETRY_INTERVAL, DEFAULT_RETRY_MAX,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where a captured batch is written.
///
/// Both modes share the same buffering and trigger logic; they only differ in
/// which task performs the bulk write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// The write is spawned on the runtime and the triggering call returns
    /// immediately. Several batches may be in flight at once.
    #[default]
    Background,
    /// The write runs on the task that triggered it, which waits for the
    /// write (retries included) to finish.
    Inline,
}

/// Write cache configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use write_cache::{CacheConfig, WriteMode};
///
/// let config = CacheConfig {
///     mode: WriteMode::Inline,
///     retry_max: 3,
///     ..CacheConfig::new(500, Duration::from_secs(2))
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Buffered document count that triggers a flush. A trigger, not a cap:
    /// a single `insert_many` may push a larger batch.
    pub cache_size: usize,

    /// Maximum time between two periodic flush checks
    pub flush_time: Duration,

    /// Delay between write attempts after a transient failure
    pub retry_interval: Duration,

    /// Maximum write attempts per batch before the failure is reported
    pub retry_max: u32,

    /// Where batches are written
    pub mode: WriteMode,

    /// Deliver flush and error events on the blocking pool instead of the
    /// task that finished the write
    pub notify_concurrently: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            flush_time: DEFAULT_FLUSH_TIME,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            retry_max: DEFAULT_RETRY_MAX,
            mode: WriteMode::default(),
            notify_concurrently: false,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the given triggers and default retry settings.
    pub fn new(cache_size: usize, flush_time: Duration) -> Self {
        Self {
            cache_size,
            flush_time,
            ..Self::default()
        }
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidCacheSize`] if `cache_size` is zero
    /// - [`ConfigError::InvalidFlushTime`] if `flush_time` is zero
    /// - [`ConfigError::InvalidRetryMax`] if `retry_max` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_size == 0 {
            return Err(ConfigError::InvalidCacheSize(self.cache_size));
        }
        if self.flush_time.is_zero() {
            return Err(ConfigError::InvalidFlushTime(self.flush_time));
        }
        if self.retry_max == 0 {
            return Err(ConfigError::InvalidRetryMax(self.retry_max));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_interval, Duration::from_secs(10));
        assert_eq!(config.retry_max, 10);
        assert_eq!(config.mode, WriteMode::Background);
    }

    #[test]
    fn test_zero_cache_size_rejected() {
        let config = CacheConfig::new(0, Duration::from_secs(1));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCacheSize(0))
        ));
    }

    #[test]
    fn test_zero_flush_time_rejected() {
        let config = CacheConfig::new(10, Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFlushTime(_))
        ));
    }

    #[test]
    fn test_zero_retry_max_rejected() {
        let config = CacheConfig {
            retry_max: 0,
            ..CacheConfig::new(10, Duration::from_secs(1))
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRetryMax(0))));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"cache_size": 25, "mode": "inline"}"#).unwrap();
        assert_eq!(config.cache_size, 25);
        assert_eq!(config.mode, WriteMode::Inline);
        assert_eq!(config.flush_time, DEFAULT_FLUSH_TIME);
        assert_eq!(config.retry_max, DEFAULT_RETRY_MAX);
        assert!(!config.notify_concurrently);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }
}

//! Error type definitions.
//!
//! This module defines all error types used throughout the crate.

use std::sync::Arc;
use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors raised by a document store while writing a batch.
///
/// The variant decides whether the write is retried: see
/// [`StoreError::is_transient`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store did not answer in time.
    #[error("Network timeout: {0}")]
    NetworkTimeout(String),

    /// The connection to the store was lost or could not be established.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The store refused the write (duplicate key, validation, auth, ...).
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// Any other failure reported by the store client.
    #[error("Store error: {0}")]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Returns `true` for recoverable network conditions that are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::NetworkTimeout(_) | StoreError::ConnectionLost(_)
        )
    }
}

/// Invalid cache configuration, reported when the cache is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The item-count trigger must be at least one.
    #[error("cache_size must be greater than zero, got {0}")]
    InvalidCacheSize(usize),

    /// The periodic flush interval must be non-zero.
    #[error("flush_time must be greater than zero, got {0:?}")]
    InvalidFlushTime(Duration),

    /// At least one write attempt is required.
    #[error("retry_max must be at least 1, got {0}")]
    InvalidRetryMax(u32),
}

/// Errors returned by the write cache API.
#[derive(Error, Debug)]
pub enum WriteCacheError {
    /// The cache could not be built from the given configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The batch captured by `flush` failed terminally. The same failure was
    /// delivered to the error subscribers.
    #[error("Flush of batch {batch_id} failed: {source}")]
    FlushFailed {
        /// Batch that failed
        batch_id: u64,
        /// Error reported by the store
        source: Arc<StoreError>,
    },

    /// The write task for the batch ended without reporting an outcome.
    #[error("Flush of batch {batch_id} ended without an outcome")]
    FlushAbandoned {
        /// Batch whose outcome is unknown
        batch_id: u64,
    },
}

//! Configuration constants.
//!
//! This module defines the defaults used when a cache is built without an
//! explicit value for a setting.

use std::time::Duration;

/// Default item-count threshold that triggers a flush
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Default ceiling on how long a document may sit in the buffer
pub const DEFAULT_FLUSH_TIME: Duration = Duration::from_secs(5);

// Retry strategy
/// Dead time between two write attempts after a transient store failure
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);
/// Maximum number of write attempts per batch (including the initial attempt)
pub const DEFAULT_RETRY_MAX: u32 = 10;

/// Module path used when filtering this crate's log output
pub const LOG_TARGET: &str = "write_cache";

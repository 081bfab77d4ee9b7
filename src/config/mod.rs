//! Cache configuration and constants.
//!
//! This module provides:
//! - Default values for the flush and retry settings
//! - The [`CacheConfig`] struct and its validation
//! - Write mode and logging option types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{CacheConfig, LogFormat, LogLevel, WriteMode};

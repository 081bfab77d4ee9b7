//! Error handling and flush statistics.
//!
//! This module provides:
//! - Error type definitions for the store, configuration, and cache API
//! - Flush statistics tracking (batches, documents, retries, triggers)

mod stats;
mod types;

// Re-export public API
pub use stats::{FlushStats, FlushTrigger};
pub use types::{ConfigError, InitializationError, StoreError, WriteCacheError};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_flush_stats_initialization() {
        let stats = FlushStats::new();
        // All triggers should be initialized to 0
        for trigger in FlushTrigger::iter() {
            assert_eq!(stats.trigger_count(trigger), 0);
        }
        assert_eq!(stats.batches_written(), 0);
        assert_eq!(stats.batches_failed(), 0);
        assert_eq!(stats.retries(), 0);
    }

    #[test]
    fn test_flush_stats_success_and_failure() {
        let stats = FlushStats::new();
        stats.record_success(10, 1);
        stats.record_success(5, 3);
        stats.record_failure(4, 10);

        assert_eq!(stats.batches_written(), 2);
        assert_eq!(stats.documents_written(), 15);
        assert_eq!(stats.batches_failed(), 1);
        assert_eq!(stats.documents_failed(), 4);
        // 0 + 2 + 9
        assert_eq!(stats.retries(), 11);
    }

    #[test]
    fn test_flush_stats_triggers() {
        let stats = FlushStats::new();
        stats.record_trigger(FlushTrigger::Size);
        stats.record_trigger(FlushTrigger::Size);
        stats.record_trigger(FlushTrigger::Timer);

        assert_eq!(stats.trigger_count(FlushTrigger::Size), 2);
        assert_eq!(stats.trigger_count(FlushTrigger::Timer), 1);
        assert_eq!(stats.trigger_count(FlushTrigger::Manual), 0);
        assert_eq!(stats.total_flushes(), 3);
    }

    #[test]
    fn test_zero_attempts_do_not_underflow() {
        let stats = FlushStats::new();
        stats.record_failure(1, 0);
        assert_eq!(stats.retries(), 0);
    }

    #[test]
    fn test_all_triggers_have_string_representation() {
        for trigger in FlushTrigger::iter() {
            assert!(!trigger.as_str().is_empty());
            assert_eq!(trigger.to_string(), trigger.as_str());
        }
    }
}

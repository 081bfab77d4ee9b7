//! Retry strategy for bulk writes.

use std::time::Duration;

use tokio_retry::strategy::FixedInterval;

use crate::config::CacheConfig;

/// Bounded retry-with-delay for one batch.
///
/// `max_attempts` counts every call to the store, the first one included, so
/// at most `max_attempts - 1` delays of `interval` are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed delay between attempts.
    pub interval: Duration,
    /// Total store calls per batch, the first one included.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy from a delay and an attempt limit.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Delays to wait between consecutive attempts.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        FixedInterval::new(self.interval).take(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl From<&CacheConfig> for RetryPolicy {
    fn from(config: &CacheConfig) -> Self {
        RetryPolicy::new(config.retry_interval, config.retry_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_yields_one_delay_less_than_attempts() {
        let policy = RetryPolicy::new(Duration::from_millis(200), 4);
        let delays: Vec<Duration> = policy.strategy().collect();
        assert_eq!(delays, vec![Duration::from_millis(200); 3]);
    }

    #[test]
    fn test_single_attempt_has_no_delays() {
        let policy = RetryPolicy::new(Duration::from_secs(1), 1);
        assert_eq!(policy.strategy().count(), 0);
    }

    #[test]
    fn test_zero_attempts_does_not_underflow() {
        let policy = RetryPolicy::new(Duration::from_secs(1), 0);
        assert_eq!(policy.strategy().count(), 0);
    }

    #[test]
    fn test_policy_from_config() {
        let config = CacheConfig {
            retry_interval: Duration::from_secs(3),
            retry_max: 5,
            ..CacheConfig::default()
        };
        assert_eq!(
            RetryPolicy::from(&config),
            RetryPolicy::new(Duration::from_secs(3), 5)
        );
    }
}

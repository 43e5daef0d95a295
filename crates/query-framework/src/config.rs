//! # Query Configuration
//!
//! Retry, garbage collection and channel sizing for a [`QueryCache`](crate::QueryCache).

use std::time::Duration;

/// Settings for the query cache.
///
/// ```rust
/// use query_framework::QueryConfig;
/// use std::time::Duration;
///
/// let config = QueryConfig::default()
///     .with_retry(1)
///     .with_gc_time(Some(Duration::from_secs(60)));
/// assert_eq!(config.retry, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Extra attempts after the first failure.
    pub retry: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
    /// How long an unobserved entry stays cached. `None` keeps it until invalidated.
    pub gc_time: Option<Duration>,
    /// Capacity of the client-to-cache channel.
    pub buffer_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retry: 3,
            retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            gc_time: Some(Duration::from_secs(5 * 60)),
            buffer_size: 32,
        }
    }
}

impl QueryConfig {
    /// Deterministic settings for tests: no retries and no garbage collection.
    pub fn for_tests() -> Self {
        Self {
            retry: 0,
            gc_time: None,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[must_use]
    pub fn with_gc_time(mut self, gc_time: Option<Duration>) -> Self {
        self.gc_time = gc_time;
        self
    }

    /// Backoff before retry number `attempt` (zero based).
    pub fn retry_delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .saturating_mul(factor)
            .min(self.max_retry_delay)
    }

    /// Total backoff a failing fetch sleeps through before it settles as failed.
    pub fn retry_budget(&self) -> Duration {
        (0..self.retry)
            .map(|attempt| self.retry_delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = QueryConfig::default();
        assert_eq!(config.retry_delay_for(0), Duration::from_secs(1));
        assert_eq!(config.retry_delay_for(1), Duration::from_secs(2));
        assert_eq!(config.retry_delay_for(3), Duration::from_secs(8));
        assert_eq!(config.retry_delay_for(10), Duration::from_secs(30));
        assert_eq!(config.retry_delay_for(40), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_budget_sums_every_backoff() {
        assert_eq!(QueryConfig::default().retry_budget(), Duration::from_secs(7));
        assert_eq!(QueryConfig::for_tests().retry_budget(), Duration::ZERO);
    }

    #[test]
    fn test_for_tests_disables_retry_and_gc() {
        let config = QueryConfig::for_tests();
        assert_eq!(config.retry, 0);
        assert_eq!(config.gc_time, None);
    }
}

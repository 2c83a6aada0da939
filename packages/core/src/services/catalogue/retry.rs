//! Retry policy for catalogue reads.

use std::time::Duration;

/// Attempts made per page when the caller does not specify a count.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubled for every retry after it.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Bounded exponential backoff: `base_delay × 2^n` before retry `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay to wait before retry `retry` (0-based: the first retry is 0).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor)
    }
}

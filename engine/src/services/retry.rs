//! Retry timing shared by the HTTP adapters

use rand::Rng;
use std::time::Duration;

/// Bounded exponential backoff with jitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
}

impl RetryPolicy {
    /// Generator calls: two retries
    pub fn generation() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(750),
            max_delay: Duration::from_secs(10),
            jitter: Duration::from_millis(400),
        }
    }

    /// Availability rate limits: four retries
    pub fn availability() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
        }
    }

    /// Zero-delay policy for tests
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `attempt` (0-based)
    ///
    /// A provider hint wins over the computed backoff; both are capped.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let delay = match hint {
            Some(hint) => hint,
            None => {
                let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
                let jitter_ms = self.jitter.as_millis() as u64;
                let jitter = if jitter_ms == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
                };
                self.base_delay.saturating_mul(factor) + jitter
            }
        };
        delay.min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            jitter: Duration::ZERO,
        };
        assert_eq!(policy.delay_for(0, None), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1, None), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2, None), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3, None), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40, None), Duration::from_millis(500));
    }

    #[test]
    fn test_hint_overrides_backoff() {
        let policy = RetryPolicy::availability();
        assert_eq!(policy.delay_for(0, Some(Duration::from_secs(3))), Duration::from_secs(3));
        assert_eq!(policy.delay_for(0, Some(Duration::from_secs(90))), Duration::from_secs(30));
        assert_eq!(policy.attempts(), 5);
    }
}

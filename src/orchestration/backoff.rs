//! # Retry Backoff
//!
//! Exponential backoff between execution attempts, with optional jitter to
//! avoid synchronized retries when several workflows share a downstream
//! resource.

use std::time::Duration;

use crate::config::BackoffConfig;

/// Computes the delay before a given retry attempt.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
}

impl BackoffPolicy {
    pub fn new(config: &BackoffConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.multiplier,
            jitter: config.jitter,
        }
    }

    /// Delay to wait before `attempt` (1-based; the first attempt never
    /// waits). Exponential in the number of prior failures, capped at the
    /// configured maximum, with up to ±25% jitter when enabled.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = (attempt - 2).min(16);
        let raw = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent as i32);
        let capped = raw.min(self.max_delay.as_millis() as f64);

        let with_jitter = if self.jitter {
            let factor = 0.75 + fastrand::f64() * 0.5;
            capped * factor
        } else {
            capped
        };

        Duration::from_millis(with_jitter as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base_ms: u64, max_ms: u64, multiplier: f64, jitter: bool) -> BackoffPolicy {
        BackoffPolicy::new(&BackoffConfig {
            base_delay_ms: base_ms,
            max_delay_ms: max_ms,
            multiplier,
            jitter,
        })
    }

    #[test]
    fn test_first_attempt_never_waits() {
        let p = policy(1000, 30000, 2.0, false);
        assert_eq!(p.delay_for_attempt(1), Duration::ZERO);
    }

    #[test]
    fn test_exponential_growth_without_jitter() {
        let p = policy(100, 30000, 2.0, false);
        assert_eq!(p.delay_for_attempt(2), Duration::from_millis(100));
        assert_eq!(p.delay_for_attempt(3), Duration::from_millis(200));
        assert_eq!(p.delay_for_attempt(4), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let p = policy(1000, 2500, 10.0, false);
        assert_eq!(p.delay_for_attempt(5), Duration::from_millis(2500));
    }

    #[test]
    fn test_zero_base_disables_waits() {
        let p = policy(0, 30000, 2.0, true);
        assert_eq!(p.delay_for_attempt(4), Duration::ZERO);
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let p = policy(1000, 30000, 2.0, true);
        for _ in 0..50 {
            let d = p.delay_for_attempt(3).as_millis() as f64;
            assert!((1500.0..=2500.0).contains(&d), "delay {d} out of band");
        }
    }
}

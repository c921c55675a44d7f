//! Retry delay schedule for failed reads and consumes.
//!
//! [`BackoffPolicy`] maps a retry attempt number to the delay the engine
//! waits before re-reading the current window: attempt `n` waits
//! `first × factor^n`, clamped to `max`, with optional jitter on top. The
//! base is computed from the attempt number alone — jittered output never
//! feeds back into later attempts, so randomized delays cannot drift
//! downward over time.
//!
//! The engine retries without bound; `max` is the only brake on a
//! permanently failing reader or consumer. Deployments that cannot tolerate
//! an indefinitely stalled task should alert on the failure events rather
//! than expect the engine to give up.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use streamvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(250),
//!     max: Duration::from_secs(8),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(250));
//! assert_eq!(backoff.next(1), Duration::from_millis(500));
//! // 250ms × 2^8 overshoots the cap
//! assert_eq!(backoff.next(8), Duration::from_secs(8));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Pure mapping from attempt number to retry delay.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Ceiling no computed delay exceeds.
    pub max: Duration,
    /// Multiplicative growth per attempt (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the computed base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Exponential doubling from 100ms up to 30s, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Delay for the given attempt (0-indexed).
    ///
    /// With [`JitterPolicy::None`] the result is deterministic and, for
    /// `factor >= 1.0`, non-decreasing in `attempt`. Overflowing or
    /// non-finite intermediate values collapse to `max`.
    pub fn next(&self, attempt: u32) -> Duration {
        let growth = self.factor.powi(attempt.min(i32::MAX as u32) as i32);
        let scaled = self.first.as_secs_f64() * growth;

        let base = if scaled.is_finite() && (0.0..=self.max.as_secs_f64()).contains(&scaled) {
            Duration::from_secs_f64(scaled)
        } else {
            self.max
        };

        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exponential(first_ms: u64, max: Duration) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn doubles_from_first() {
        let policy = exponential(25, Duration::from_secs(30));
        assert_eq!(policy.next(0), Duration::from_millis(25));
        assert_eq!(policy.next(1), Duration::from_millis(50));
        assert_eq!(policy.next(2), Duration::from_millis(100));
        assert_eq!(policy.next(5), Duration::from_millis(800));
    }

    #[test]
    fn delays_never_decrease_with_attempt() {
        let policy = exponential(50, Duration::from_secs(5));
        let mut prev = Duration::ZERO;
        for attempt in 0..20 {
            let delay = policy.next(attempt);
            assert!(delay >= prev, "attempt {attempt}: {delay:?} < {prev:?}");
            prev = delay;
        }
    }

    #[test]
    fn factor_one_is_constant() {
        let policy = BackoffPolicy {
            factor: 1.0,
            ..exponential(500, Duration::from_secs(30))
        };
        for attempt in [0, 3, 9] {
            assert_eq!(policy.next(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn growth_stops_at_max() {
        let policy = exponential(100, Duration::from_secs(1));
        assert_eq!(policy.next(10), Duration::from_secs(1));
    }

    #[test]
    fn first_exceeding_max_is_capped_immediately() {
        let policy = exponential(10_000, Duration::from_secs(5));
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn overflowing_exponent_collapses_to_max() {
        let policy = exponential(100, Duration::from_secs(10));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn full_jitter_stays_within_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            factor: 1.0,
            ..exponential(1_000, Duration::from_secs(30))
        };
        for attempt in 0..50 {
            assert!(policy.next(attempt) <= Duration::from_millis(1_000));
        }
    }

    #[test]
    fn equal_jitter_keeps_at_least_half() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            factor: 1.0,
            ..exponential(1_000, Duration::from_secs(30))
        };
        for attempt in 0..50 {
            let delay = policy.next(attempt);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1_000));
        }
    }
}

//! # Jitter applied to retry delays.
//!
//! Many tasks back off at once when the source cluster has a hiccup; without
//! randomization they all retry at the same instant and hit it again
//! together. [`JitterPolicy`] spreads the retries out.
//!
//! - [`JitterPolicy::None`] — exact delays, fully deterministic
//! - [`JitterPolicy::Full`] — random delay in `[0, base]`
//! - [`JitterPolicy::Equal`] — `base/2 + random[0, base/2]`

use std::time::Duration;

use rand::Rng;

/// Randomization applied to a computed backoff delay.
///
/// `None` keeps [`BackoffPolicy::next`](crate::BackoffPolicy::next) a pure
/// function of the attempt number, which is what deterministic tests want.
/// `Equal` is the recommended production setting: it keeps at least half of
/// the base delay while still desynchronizing retries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact computed delay.
    #[default]
    None,

    /// Random delay in `[0, base]`. Maximum spread, can collapse the wait
    /// to near zero.
    Full,

    /// `base/2 + random[0, base/2]`. Bounded below by half the base delay.
    Equal,
}

impl JitterPolicy {
    /// Applies this jitter to the given base delay.
    pub fn apply(&self, base: Duration) -> Duration {
        let ms = base.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        match self {
            JitterPolicy::None => base,
            JitterPolicy::Full => {
                Duration::from_millis(rand::rng().random_range(0..=ms))
            }
            JitterPolicy::Equal => {
                let half = ms / 2;
                let jitter = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + jitter)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let base = Duration::from_millis(750);
        assert_eq!(JitterPolicy::None.apply(base), base);
    }

    #[test]
    fn zero_base_stays_zero() {
        for policy in [JitterPolicy::None, JitterPolicy::Full, JitterPolicy::Equal] {
            assert_eq!(policy.apply(Duration::ZERO), Duration::ZERO);
        }
    }

    #[test]
    fn full_jitter_bounded_by_base() {
        let base = Duration::from_millis(400);
        for _ in 0..100 {
            assert!(JitterPolicy::Full.apply(base) <= base);
        }
    }

    #[test]
    fn equal_jitter_bounded_by_half_and_base() {
        let base = Duration::from_millis(400);
        for _ in 0..100 {
            let jittered = JitterPolicy::Equal.apply(base);
            assert!(jittered >= Duration::from_millis(200));
            assert!(jittered <= base);
        }
    }
}

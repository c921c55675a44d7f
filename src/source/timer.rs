//! # Delay scheduling without blocking a thread.
//!
//! Every wait in the engine — the confidence-window wait before a read and
//! the backoff wait after a failure — goes through [`TimerService`]. The
//! indirection exists for tests: plugging in an instantly-resolving recorder
//! makes the whole state machine runnable without wall-clock time.

use std::time::Duration;

use async_trait::async_trait;

/// Non-blocking delay primitive.
#[async_trait]
pub trait TimerService: Send + Sync + 'static {
    /// Completes after roughly `duration` of wall time.
    async fn sleep(&self, duration: Duration);
}

/// Production timer backed by [`tokio::time::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

#[async_trait]
impl TimerService for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

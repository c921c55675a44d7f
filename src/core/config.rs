//! # Runtime and engine configuration.
//!
//! Two bundles, consumed at different levels:
//! 1. **[`WorkerConfig`]** — everything one task's action loop needs: window
//!    sizes, the backoff policy, and the four collaborators. Passed (shared)
//!    to every [`TaskActor`](crate::TaskActor).
//! 2. **[`Config`]** — supervisor-level runtime settings (shutdown grace,
//!    event bus capacity).
//!
//! Collaborators are explicit fields, never process-wide singletons — that
//! is what lets tests substitute deterministic fakes for the timer, reader,
//! consumer, and transport.

use std::sync::Arc;
use std::time::Duration;

use crate::policies::BackoffPolicy;
use crate::source::{Consumer, ReaderFactory, TimerService, TokioTimer, Transport};

/// Default width of one query window.
pub const DEFAULT_WINDOW_SIZE: Duration = Duration::from_secs(30);

/// Default grace period between a window closing and it becoming safe to read.
pub const DEFAULT_CONFIDENCE_WINDOW_SIZE: Duration = Duration::from_secs(30);

/// Per-task engine configuration: window geometry, retry policy, and the
/// collaborators the action loop drives.
///
/// Cheap to clone — collaborators are held behind `Arc`.
///
/// ## Example
/// ```no_run
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # use streamvisor::{WorkerConfig, BackoffPolicy, JitterPolicy};
/// # fn collaborators() -> (Arc<dyn streamvisor::ReaderFactory>, Arc<dyn streamvisor::Consumer>, Arc<dyn streamvisor::Transport>) { unimplemented!() }
/// let (reader_factory, consumer, transport) = collaborators();
/// let cfg = WorkerConfig::new(reader_factory, consumer, transport)
///     .with_window_size(Duration::from_secs(10))
///     .with_confidence_window_size(Duration::from_secs(5))
///     .with_backoff(BackoffPolicy {
///         first: Duration::from_millis(50),
///         max: Duration::from_secs(10),
///         factor: 2.0,
///         jitter: JitterPolicy::Equal,
///     });
/// ```
#[derive(Clone)]
pub struct WorkerConfig {
    /// Width of each query window. Successive windows advance by exactly
    /// this much.
    pub window_size: Duration,

    /// Grace period absorbing replication lag: a window is only read once
    /// `window_end + confidence_window_size` has passed, so late writes have
    /// almost certainly landed in the log.
    pub confidence_window_size: Duration,

    /// Delay schedule for retries after reader/consumer failures.
    pub backoff: BackoffPolicy,

    /// Opens a fresh reader per window (and per retry).
    pub reader_factory: Arc<dyn ReaderFactory>,

    /// Application hook receiving every delivered change.
    pub consumer: Arc<dyn Consumer>,

    /// Progress checkpoint sink.
    pub transport: Arc<dyn Transport>,

    /// Delay scheduler; replace in tests to avoid wall-clock waits.
    pub timer: Arc<dyn TimerService>,
}

impl WorkerConfig {
    /// Creates a configuration with default window geometry (30 s windows,
    /// 30 s confidence), the default backoff policy, and the tokio timer.
    pub fn new(
        reader_factory: Arc<dyn ReaderFactory>,
        consumer: Arc<dyn Consumer>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            confidence_window_size: DEFAULT_CONFIDENCE_WINDOW_SIZE,
            backoff: BackoffPolicy::default(),
            reader_factory,
            consumer,
            transport,
            timer: Arc::new(TokioTimer),
        }
    }

    /// Returns the config with an updated window size.
    pub fn with_window_size(mut self, window_size: Duration) -> Self {
        self.window_size = window_size;
        self
    }

    /// Returns the config with an updated confidence window size.
    pub fn with_confidence_window_size(mut self, confidence_window_size: Duration) -> Self {
        self.confidence_window_size = confidence_window_size;
        self
    }

    /// Returns the config with an updated backoff policy.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the config with a replacement timer service.
    pub fn with_timer(mut self, timer: Arc<dyn TimerService>) -> Self {
        self.timer = timer;
        self
    }
}

/// Supervisor-level runtime settings, distinct from the per-task
/// [`WorkerConfig`].
#[derive(Clone, Debug)]
pub struct Config {
    /// How long a shutdown may take.
    ///
    /// After a termination signal, actors finish their in-flight action and
    /// exit at the next boundary; the supervisor waits at most `grace` for
    /// that to happen before giving up with `RuntimeError::GraceExceeded`.
    /// `0s` means no waiting at all.
    pub grace: Duration,

    /// Ring-buffer size of the event bus.
    ///
    /// A receiver that falls further behind than this sees `Lagged` and
    /// loses the overwritten events. Clamped to at least 1.
    pub bus_capacity: usize,
}

impl Config {
    /// Bus capacity with the minimum-of-1 clamp applied.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// One minute of shutdown grace, 1024-event bus.
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

//! What the runtime tells the outside world.
//!
//! Failure logging required of the engine — task identity, formatted state,
//! and attempt number on every reader/consume failure — takes the form of
//! [`Event`] values published on the bus, alongside lifecycle, window
//! progress, shutdown, and subscriber-fault notifications. [`EventKind`]
//! names what happened; the optional fields carry the payload each kind
//! documents.
//!
//! Events may reach a subscriber interleaved across tasks. The `seq` field
//! is a process-wide monotonic counter assigned at creation, so consumers
//! can reconstruct the true order when it matters.
//!
//! ```rust
//! use streamvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ConsumeFailed)
//!     .with_task("task(0aff01)")
//!     .with_reason("downstream write refused")
//!     .with_attempt(3);
//!
//! assert_eq!(ev.kind, EventKind::ConsumeFailed);
//! assert_eq!(ev.task.as_deref(), Some("task(0aff01)"));
//! assert_eq!(ev.attempt, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Process-wide source of `seq` values.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What kind of thing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle ===
    /// A task actor started driving its action loop.
    ///
    /// Sets: `task`, `state`, `at`, `seq`.
    TaskStarted,

    /// A task actor observed cancellation and stopped.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskStopped,

    // === Engine failures ===
    /// Opening a reader for the current window failed.
    ///
    /// Sets: `task`, `state`, `attempt`, `reason`, `at`, `seq`.
    ReaderOpenFailed,

    /// Pulling the next change from the reader failed.
    ///
    /// Sets: `task`, `state`, `attempt`, `reason`, `at`, `seq`.
    ChangeReadFailed,

    /// The application consumer rejected a change.
    ///
    /// Sets: `task`, `state`, `attempt`, `reason`, `at`, `seq`.
    ConsumeFailed,

    /// Retry scheduled after a failure.
    ///
    /// Sets: `task`, `attempt` (the failed attempt), `delay_ms`, `reason`,
    /// `at`, `seq`.
    BackoffScheduled,

    // === Window progress ===
    /// The current window drained successfully after earlier retries.
    ///
    /// Only emitted when at least one retry happened; a window consumed on
    /// the first attempt passes silently.
    ///
    /// Sets: `task`, `state`, `attempt` (retries it took), `at`, `seq`.
    WindowDrained,

    /// The task advanced to the next window.
    ///
    /// Sets: `task`, `state` (the new window), `at`, `seq`.
    WindowAdvanced,

    // === Shutdown ===
    /// A termination signal reached the process.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All tasks stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Some tasks were still running when the grace period ran out.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    // === Subscriber faults ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,
}

/// One runtime notification.
///
/// `seq` and `at` are always set; the remaining fields depend on the
/// [`EventKind`] (each variant documents what it carries). String payloads
/// are `Arc<str>` because every subscriber receives its own clone of the
/// event.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide monotonic sequence number, assigned at creation.
    pub seq: u64,
    /// Wall-clock creation time.
    pub at: SystemTime,
    /// What happened.
    pub kind: EventKind,

    /// Display form of the task id, if applicable.
    pub task: Option<Arc<str>>,
    /// Display form of the task state the event refers to.
    pub state: Option<Arc<str>>,
    /// Attempt count (0-based, as used by the backoff policy).
    pub attempt: Option<u32>,
    /// Backoff delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Free-form explanation: error text, overflow cause, panic message.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Stamps a new event of the given kind with the next `seq` and the
    /// current wall-clock time; payload fields start empty.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            state: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a task identity.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a formatted task state.
    #[inline]
    pub fn with_state(mut self, state: impl Into<Arc<str>>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Fault report: a subscriber's queue rejected an event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Fault report: a subscriber panicked while handling an event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskStarted);
        let b = Event::new(EventKind::TaskStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_is_stored_as_millis() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(2));
        assert_eq!(ev.delay_ms, Some(2_000));
    }
}

//! # TaskAction: the per-task read-consume-advance state machine.
//!
//! One logical stream of CDC data is driven through repeating cycles of:
//! wait for a time window to become safe to read, open a reader for it, pull
//! changes one at a time, hand each to the consumer, and advance to the next
//! window. Any step may fail; failure sends the task back to
//! [`TaskAction::ReadNewWindow`] after a backoff, without corrupting
//! progress.
//!
//! ## Transitions
//! ```text
//! ReadNewWindow(task, attempt)
//!    ├─ success ──► ReadChange(task, reader, attempt)
//!    └─ failure ──► backoff(attempt) ──► ReadNewWindow(task, attempt+1)
//!
//! ReadChange(task, reader, attempt)
//!    ├─ success ──► ConsumeChange(task, reader, change?, attempt)
//!    └─ failure ──► backoff(attempt) ──► ReadNewWindow(task, attempt+1)   // reader discarded
//!
//! ConsumeChange(task, reader, change?, attempt)
//!    ├─ change present, consume ok ──► ReadChange(task', reader, attempt) // task' records the change
//!    ├─ change present, consume err ─► backoff(attempt) ──► ReadNewWindow(task, attempt+1)
//!    │                                                      // task unchanged: window re-read from start
//!    └─ change absent ──► MoveToNextWindow(task)
//!
//! MoveToNextWindow(task)
//!    └─ always ──► ReadNewWindow(task'', 0)                 // task'' = window advanced
//! ```
//!
//! ## Rules
//! - `run` **never fails**: every error is absorbed into a backoff + retry;
//!   the only observable trace is the events it publishes.
//! - Retries are **unbounded** — all failures are treated as transient.
//! - Exactly one action is outstanding per task; the actor loop awaits each
//!   `run` before starting the next.
//! - The attempt counter resets **only** on a window advance, not on a
//!   successful consume within an ongoing window.
//! - A consumer failure reverts the task to its last committed progress; the
//!   fresh reader then re-scans the window from its start, so consumers see
//!   at-least-once delivery within a window.

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::config::WorkerConfig;
use crate::error::CdcError;
use crate::events::{Bus, Event, EventKind};
use crate::model::{RawChange, Task, TaskState};
use crate::source::ChangeReader;

/// The next unit of work for a task. Exactly one variant is live per task at
/// any time; the driver loop repeatedly exchanges the current action for the
/// next via [`TaskAction::run`].
pub enum TaskAction {
    /// Wait until the task's window is safe to read, then open a reader for it.
    ReadNewWindow {
        task: Task,
        /// Retry attempt counter, reset only by a window advance.
        attempt: u32,
    },

    /// Checkpoint current progress, then pull one entry from the reader.
    ReadChange {
        task: Task,
        reader: Box<dyn ChangeReader>,
        attempt: u32,
    },

    /// Deliver the pulled change (if any) to the consumer.
    ConsumeChange {
        task: Task,
        reader: Box<dyn ChangeReader>,
        /// `None` means the window is exhausted.
        change: Option<Box<dyn RawChange>>,
        attempt: u32,
    },

    /// Advance the window bounds and notify the transport.
    MoveToNextWindow { task: Task },
}

impl TaskAction {
    /// Initial action for a freshly assigned task.
    pub fn first(task: Task) -> Self {
        TaskAction::ReadNewWindow { task, attempt: 0 }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TaskAction::ReadNewWindow { .. } => "read_new_window",
            TaskAction::ReadChange { .. } => "read_change",
            TaskAction::ConsumeChange { .. } => "consume_change",
            TaskAction::MoveToNextWindow { .. } => "move_to_next_window",
        }
    }

    /// Executes this action and resolves to the next one.
    ///
    /// Never returns an error: failures are logged to `bus`, absorbed into a
    /// backoff sleep on the configured timer, and turned into a retry
    /// action. Suspension points are the window/backoff sleeps and the
    /// collaborator futures — nothing here blocks a thread.
    pub async fn run(self, cfg: &WorkerConfig, bus: &Bus) -> TaskAction {
        match self {
            TaskAction::ReadNewWindow { task, attempt } => {
                read_new_window(cfg, bus, task, attempt).await
            }
            TaskAction::ReadChange {
                task,
                reader,
                attempt,
            } => read_change(cfg, bus, task, reader, attempt).await,
            TaskAction::ConsumeChange {
                task,
                reader,
                change,
                attempt,
            } => consume_change(cfg, bus, task, reader, change, attempt).await,
            TaskAction::MoveToNextWindow { task } => move_to_next_window(cfg, bus, task).await,
        }
    }
}

/// Time left until the window may be read, or `None` when it is already safe.
///
/// A window is safe once `window_end + confidence_window` has passed: the
/// confidence margin absorbs replication lag so late writes have landed in
/// the log before the window is queried.
fn window_wait(
    state: &TaskState,
    now: DateTime<Utc>,
    confidence_window: std::time::Duration,
) -> Option<std::time::Duration> {
    let confidence = TimeDelta::from_std(confidence_window).unwrap_or_else(|_| TimeDelta::zero());
    let wait = state.window_end() - now + confidence;
    if wait > TimeDelta::zero() {
        wait.to_std().ok()
    } else {
        None
    }
}

/// Failure path shared by all three fallible steps: publish the failure and
/// the scheduled backoff, sleep, and restart window reading with a bumped
/// attempt counter. The task is passed through unchanged, so progress
/// re-derives from the last committed state.
async fn retry(
    cfg: &WorkerConfig,
    bus: &Bus,
    task: Task,
    attempt: u32,
    kind: EventKind,
    err: &CdcError,
) -> TaskAction {
    let delay = cfg.backoff.next(attempt);
    bus.publish(
        Event::new(kind)
            .with_task(task.id().to_string())
            .with_state(task.state().to_string())
            .with_attempt(attempt)
            .with_reason(err.to_string()),
    );
    bus.publish(
        Event::new(EventKind::BackoffScheduled)
            .with_task(task.id().to_string())
            .with_attempt(attempt)
            .with_delay(delay)
            .with_reason(err.to_string()),
    );
    cfg.timer.sleep(delay).await;
    TaskAction::ReadNewWindow {
        task,
        attempt: attempt + 1,
    }
}

async fn read_new_window(cfg: &WorkerConfig, bus: &Bus, task: Task, attempt: u32) -> TaskAction {
    // The wait may outlive an external stop request; in that case a reader
    // for a too-fresh window can still be created here, but the actor loop
    // stops running actions, so it is never used to deliver data.
    if let Some(wait) = window_wait(task.state(), Utc::now(), cfg.confidence_window_size) {
        cfg.timer.sleep(wait).await;
    }

    match cfg.reader_factory.create_reader(&task).await {
        Ok(reader) => TaskAction::ReadChange {
            task,
            reader,
            attempt,
        },
        Err(err) => retry(cfg, bus, task, attempt, EventKind::ReaderOpenFailed, &err).await,
    }
}

async fn read_change(
    cfg: &WorkerConfig,
    bus: &Bus,
    task: Task,
    mut reader: Box<dyn ChangeReader>,
    attempt: u32,
) -> TaskAction {
    // Checkpoint before the read so an external observer's view of progress
    // never lags behind what a prior consume already committed.
    cfg.transport.set_state(task.id(), task.state()).await;

    match reader.next_change().await {
        Ok(change) => TaskAction::ConsumeChange {
            task,
            reader,
            change,
            attempt,
        },
        // The reader is dropped here; the retry opens a fresh one.
        Err(err) => retry(cfg, bus, task, attempt, EventKind::ChangeReadFailed, &err).await,
    }
}

async fn consume_change(
    cfg: &WorkerConfig,
    bus: &Bus,
    task: Task,
    reader: Box<dyn ChangeReader>,
    change: Option<Box<dyn RawChange>>,
    attempt: u32,
) -> TaskAction {
    let Some(change) = change else {
        if attempt > 0 {
            bus.publish(
                Event::new(EventKind::WindowDrained)
                    .with_task(task.id().to_string())
                    .with_state(task.state().to_string())
                    .with_attempt(attempt),
            );
        }
        return TaskAction::MoveToNextWindow { task };
    };

    // The consumer observes the task as of before this change; the advanced
    // task takes over only after the consume succeeds.
    let advanced = task.update_state(change.id().clone());
    match cfg.consumer.consume(&task, change).await {
        Ok(()) => TaskAction::ReadChange {
            task: advanced,
            reader,
            attempt,
        },
        Err(err) => retry(cfg, bus, task, attempt, EventKind::ConsumeFailed, &err).await,
    }
}

async fn move_to_next_window(cfg: &WorkerConfig, bus: &Bus, task: Task) -> TaskAction {
    let next = task.state().moved_to_next_window(cfg.window_size);
    cfg.transport
        .move_state_to_next_window(task.id(), &next)
        .await;
    bus.publish(
        Event::new(EventKind::WindowAdvanced)
            .with_task(task.id().to_string())
            .with_state(next.to_string()),
    );
    TaskAction::ReadNewWindow {
        task: task.with_state(next),
        attempt: 0,
    }
}

//! # TaskActor: drives one task's action loop.
//!
//! A [`TaskActor`] owns one [`Task`] and repeatedly exchanges its current
//! [`TaskAction`] for the next one until cancelled. It is the "external
//! driver loop" of the state machine: the engine itself has no terminal
//! state, so the actor is the only thing that ever stops a task.
//!
//! ## Flow
//! ```text
//! TaskActor::run(token):
//!   publish TaskStarted
//!   action = TaskAction::first(task)
//!   loop {
//!     ├─► token cancelled? ──► break
//!     └─► action = action.run(cfg, bus).await
//!   }
//!   publish TaskStopped
//! ```
//!
//! ## Rules
//! - Exactly one action is outstanding at a time; the loop awaits each
//!   `run` fully before starting the next.
//! - Cancellation is observed **between actions only**. An in-flight
//!   suspension (window wait, backoff, reader I/O) completes on its own
//!   time; its resulting action is simply never run. A reader opened for a
//!   too-fresh window after a stop request is therefore created but never
//!   used to deliver data.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::action::TaskAction;
use crate::core::config::WorkerConfig;
use crate::events::{Bus, Event, EventKind};
use crate::model::Task;

/// Drives a single task through its read-consume-advance loop until the
/// runtime token is cancelled.
pub struct TaskActor {
    /// Shared engine configuration (window geometry, backoff, collaborators).
    pub cfg: Arc<WorkerConfig>,
    /// Internal event bus (used to publish lifecycle events).
    pub bus: Bus,
    /// Task to drive.
    pub task: Task,
}

impl TaskActor {
    /// Creates a new task actor.
    pub fn new(cfg: Arc<WorkerConfig>, bus: Bus, task: Task) -> Self {
        Self { cfg, bus, task }
    }

    /// Runs the actor until cancellation.
    ///
    /// The loop itself never exits on failure — every error inside an action
    /// is absorbed into a retry. The only exit is the cancellation check at
    /// each action boundary.
    pub async fn run(self, runtime_token: CancellationToken) {
        let name: Arc<str> = self.task.id().to_string().into();
        self.bus.publish(
            Event::new(EventKind::TaskStarted)
                .with_task(Arc::clone(&name))
                .with_state(self.task.state().to_string()),
        );

        let mut action = TaskAction::first(self.task);
        loop {
            if runtime_token.is_cancelled() {
                break;
            }
            action = action.run(&self.cfg, &self.bus).await;
        }

        self.bus
            .publish(Event::new(EventKind::TaskStopped).with_task(name));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::error::CdcError;
    use crate::model::{RawChange, StreamId, TaskId, TaskState};
    use crate::source::{ChangeReader, Consumer, ReaderFactory, TimerService, Transport};

    struct CountingFactory {
        creates: AtomicU32,
    }

    struct EmptyReader;

    #[async_trait]
    impl ChangeReader for EmptyReader {
        async fn next_change(&mut self) -> Result<Option<Box<dyn RawChange>>, CdcError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl ReaderFactory for CountingFactory {
        async fn create_reader(&self, _task: &Task) -> Result<Box<dyn ChangeReader>, CdcError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(EmptyReader))
        }
    }

    struct NoopConsumer;

    #[async_trait]
    impl Consumer for NoopConsumer {
        async fn consume(&self, _task: &Task, _change: Box<dyn RawChange>) -> Result<(), CdcError> {
            Ok(())
        }
    }

    struct NoopTransport;

    #[async_trait]
    impl Transport for NoopTransport {
        async fn set_state(&self, _task: &TaskId, _state: &TaskState) {}
        async fn move_state_to_next_window(&self, _task: &TaskId, _state: &TaskState) {}
    }

    /// Cancels the runtime token after a fixed number of sleeps, then
    /// resolves instantly. Keeps the actor loop finite without wall time.
    struct CancellingTimer {
        token: CancellationToken,
        remaining: Mutex<u32>,
    }

    #[async_trait]
    impl TimerService for CancellingTimer {
        async fn sleep(&self, _duration: Duration) {
            let mut left = self.remaining.lock().unwrap();
            if *left == 0 {
                self.token.cancel();
            } else {
                *left -= 1;
            }
        }
    }

    fn task() -> Task {
        Task::new(
            TaskId::new(StreamId::new([1u8])),
            TaskState::new(
                DateTime::from_timestamp_millis(0).unwrap(),
                DateTime::from_timestamp_millis(1_000).unwrap(),
            ),
        )
    }

    #[tokio::test]
    async fn cancelled_actor_runs_no_action() {
        let factory = Arc::new(CountingFactory {
            creates: AtomicU32::new(0),
        });
        let cfg = Arc::new(WorkerConfig::new(
            factory.clone(),
            Arc::new(NoopConsumer),
            Arc::new(NoopTransport),
        ));
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        let token = CancellationToken::new();
        token.cancel();
        TaskActor::new(cfg, bus, task()).run(token).await;

        assert_eq!(factory.creates.load(Ordering::SeqCst), 0);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::TaskStarted);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::TaskStopped);
    }

    #[tokio::test]
    async fn actor_stops_at_next_action_boundary() {
        let token = CancellationToken::new();
        let factory = Arc::new(CountingFactory {
            creates: AtomicU32::new(0),
        });
        // Cancel during the second window wait: the first window is
        // processed fully, the in-flight action completes, then the loop
        // observes the token and exits.
        let timer = Arc::new(CancellingTimer {
            token: token.clone(),
            remaining: Mutex::new(1),
        });
        let cfg = Arc::new(
            WorkerConfig::new(factory.clone(), Arc::new(NoopConsumer), Arc::new(NoopTransport))
                .with_timer(timer)
                .with_window_size(Duration::from_secs(3600)),
        );
        let bus = Bus::new(16);

        // Windows end in the future, so every ReadNewWindow suspends first.
        let now = chrono::Utc::now();
        let fresh = Task::new(
            TaskId::new(StreamId::new([1u8])),
            TaskState::new(now, now + chrono::TimeDelta::seconds(1)),
        );
        TaskActor::new(cfg, bus, fresh).run(token).await;

        // First window wait + reader, second wait triggered the cancel, and
        // the reader for that second window was still created afterwards.
        assert_eq!(factory.creates.load(Ordering::SeqCst), 2);
    }
}

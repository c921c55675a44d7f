//! # streamvisor
//!
//! **Streamvisor** is a lightweight change-data-capture consumer runtime for
//! Rust.
//!
//! It continuously drains a CDC log produced by a distributed database,
//! delivering every logged mutation at-least-once to an application-supplied
//! consumer, while tolerating transient failures of the underlying transport
//! with backoff-driven retries that never lose or silently drop data.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Task     │   │     Task     │   │     Task     │
//!     │ (stream #1)  │   │ (stream #2)  │   │ (stream #3)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (owns the runtime)                                    │
//! │  - Bus (event broadcast ring)                                     │
//! │  - AliveTracker (running-task snapshot for shutdown)              │
//! │  - SubscriberSet (one queue + worker per subscriber)              │
//! │  - WorkerConfig (window geometry, backoff, collaborators)         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  TaskActor   │   │  TaskActor   │   │  TaskActor   │
//!     │ (action loop)│   │ (action loop)│   │ (action loop)│
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Publishes        │ Publishes        │ Publishes
//!      │ Events:          │ Events:          │ Events:
//!      │ - TaskStarted    │ - ConsumeFailed  │ - WindowAdvanced
//!      │ - BackoffSched.  │ - WindowDrained  │ - ...
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (shared broadcast ring)                   │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                          SubscriberSet (per-sub queues, workers)
//!                                   ▼
//!                     sub.on_event(&Event)  (logging, metrics, ...)
//! ```
//!
//! ### Task lifecycle
//! Each actor drives one [`Task`] through the [`TaskAction`] state machine:
//! ```text
//! loop {
//!   ReadNewWindow ── wait until window_end + confidence has passed
//!   │               ── open a reader for the window
//!   │                    └─ failure → backoff(attempt) → ReadNewWindow(attempt+1)
//!   ReadChange    ── checkpoint state to Transport, pull one change
//!   │                    └─ failure → backoff(attempt) → ReadNewWindow(attempt+1)
//!   ConsumeChange ── hand the change to the Consumer
//!   │     ├─ success   → ReadChange (task records the change)
//!   │     ├─ failure   → backoff(attempt) → ReadNewWindow(attempt+1)
//!   │     │              (task unchanged: the window is re-read from its
//!   │     │               start, so the consumer sees re-delivery)
//!   │     └─ exhausted → MoveToNextWindow
//!   MoveToNextWindow ── advance both bounds, notify Transport, attempt=0
//! }
//! ```
//! Retries are unbounded: every failure is treated as transient. The only
//! way a task stops is the supervisor's cancellation at an action boundary.
//!
//! ## Features
//! | Area               | Description                                                       | Key types / traits                        |
//! |--------------------|-------------------------------------------------------------------|-------------------------------------------|
//! | **Collaborators**  | Plug in the query layer, consumer, and checkpoint sink.           | [`ReaderFactory`], [`Consumer`], [`Transport`] |
//! | **Policies**       | Configure retry delays for failed reads/consumes.                 | [`BackoffPolicy`], [`JitterPolicy`]       |
//! | **Supervision**    | Run a set of tasks with graceful, signal-driven shutdown.         | [`Supervisor`], [`TaskActor`]             |
//! | **Subscriber API** | Hook into lifecycle events (logging, metrics, custom subscribers).| [`Subscribe`]                             |
//! | **Data model**     | Immutable task/window/change values.                              | [`Task`], [`TaskState`], [`ChangeId`], [`RawChange`] |
//! | **Errors**         | Typed errors for collaborators and the runtime.                   | [`CdcError`], [`RuntimeError`]            |
//!
//! ## Optional features
//! - `logging`: enables the built-in stdout [`LogWriter`] subscriber.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use chrono::{TimeDelta, Utc};
//! use streamvisor::{
//!     AliveTracker, CdcError, ChangeReader, Config, Consumer, RawChange, ReaderFactory,
//!     StreamId, Subscribe, Supervisor, Task, TaskId, TaskState, Transport, WorkerConfig,
//! };
//!
//! struct EmptyReader;
//!
//! #[async_trait]
//! impl ChangeReader for EmptyReader {
//!     async fn next_change(&mut self) -> Result<Option<Box<dyn RawChange>>, CdcError> {
//!         Ok(None) // a real reader queries the task's window here
//!     }
//! }
//!
//! struct Source;
//!
//! #[async_trait]
//! impl ReaderFactory for Source {
//!     async fn create_reader(&self, _task: &Task) -> Result<Box<dyn ChangeReader>, CdcError> {
//!         Ok(Box::new(EmptyReader))
//!     }
//! }
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl Consumer for Printer {
//!     async fn consume(&self, task: &Task, change: Box<dyn RawChange>) -> Result<(), CdcError> {
//!         println!("{} delivered {}", task.id(), change.id());
//!         Ok(())
//!     }
//! }
//!
//! struct NoopTransport;
//!
//! #[async_trait]
//! impl Transport for NoopTransport {
//!     async fn set_state(&self, _task: &TaskId, _state: &TaskState) {}
//!     async fn move_state_to_next_window(&self, _task: &TaskId, _state: &TaskState) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let worker = WorkerConfig::new(
//!         Arc::new(Source),
//!         Arc::new(Printer),
//!         Arc::new(NoopTransport),
//!     );
//!
//!     let alive = Arc::new(AliveTracker::new());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![alive.clone()];
//!     let sup = Supervisor::new(Config::default(), worker, subs, alive);
//!
//!     // Task assignment happens outside the runtime; here: one stream,
//!     // starting one window in the past.
//!     let now = Utc::now();
//!     let task = Task::new(
//!         TaskId::new(StreamId::new([0x01])),
//!         TaskState::new(now - TimeDelta::seconds(30), now),
//!     );
//!
//!     sup.run(vec![task]).await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod model;
mod policies;
mod source;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Config, DEFAULT_CONFIDENCE_WINDOW_SIZE, DEFAULT_WINDOW_SIZE, Supervisor, TaskAction,
    TaskActor, WorkerConfig,
};
pub use error::{CdcError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use model::{
    Cell, ChangeId, ChangeTime, DELETED_COLUMN_PREFIX, OPERATION_COLUMN, OperationKind, RawChange,
    StreamId, TTL_COLUMN, Task, TaskId, TaskState,
};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use source::{ChangeReader, Consumer, ReaderFactory, TimerService, TokioTimer, Transport};
pub use subscribers::{AliveTracker, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

//! # Window readers: the query side of the engine.
//!
//! The engine never talks to the source database directly. For every window
//! it asks a [`ReaderFactory`] for a fresh [`ChangeReader`] scoped to the
//! task's current window, then pulls changes from it one at a time until the
//! reader reports exhaustion.
//!
//! ## Ownership
//! A reader is owned exclusively by the action chain of one window. On any
//! failure, or once the window is drained, the engine simply drops it — a
//! new reader is created for the next attempt or window. Implementations
//! that hold resources should release them in `Drop`.

use async_trait::async_trait;

use crate::error::CdcError;
use crate::model::{RawChange, Task};

/// Creates readers bounded to a task's current window.
#[async_trait]
pub trait ReaderFactory: Send + Sync + 'static {
    /// Opens a cursor over the window described by `task.state()`.
    ///
    /// The cursor always covers the window from its start — it must not skip
    /// ahead based on `last_consumed`. After a mid-window failure the engine
    /// re-reads the whole window, which is what produces the documented
    /// at-least-once re-delivery.
    async fn create_reader(&self, task: &Task) -> Result<Box<dyn ChangeReader>, CdcError>;
}

/// Cursor over the log rows of one window.
#[async_trait]
pub trait ChangeReader: Send + 'static {
    /// Pulls the next change of the window.
    ///
    /// Changes arrive in increasing [`ChangeId`](crate::ChangeId) order
    /// within the window; `Ok(None)` signals that the window is exhausted.
    /// After returning an error or `Ok(None)` the reader will not be polled
    /// again.
    async fn next_change(&mut self) -> Result<Option<Box<dyn RawChange>>, CdcError>;
}

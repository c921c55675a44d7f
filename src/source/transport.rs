//! # Progress reporting to the coordination layer.

use async_trait::async_trait;

use crate::model::{TaskId, TaskState};

/// Persists and reports a task's read progress.
///
/// How state is stored (a database table, an in-memory registry, a metrics
/// pipeline) is entirely the implementation's concern, as is any failure
/// handling — both methods are infallible from the engine's point of view.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Checkpoint write, issued before every read.
    ///
    /// Called repeatedly with monotonically advancing state; implementations
    /// must tolerate duplicate writes of the same state.
    async fn set_state(&self, task: &TaskId, state: &TaskState);

    /// Distinct notification that the task crossed a full window boundary.
    ///
    /// `state` is the state of the **new** window. Emitted once per window
    /// advance, in addition to (not instead of) the per-read checkpoints.
    async fn move_state_to_next_window(&self, task: &TaskId, state: &TaskState);
}

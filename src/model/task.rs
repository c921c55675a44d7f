//! # Task identity and progress value.
//!
//! A [`Task`] ties a stream identity to its current [`TaskState`]. It is the
//! unit of work the runtime drives: one task per stream, advancing window by
//! window. Tasks are plain immutable values — every state change produces a
//! new `Task`, never an in-place mutation.
//!
//! Stream discovery and the assignment of tasks to workers happen outside
//! this crate; tasks arrive here already built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::change::{ChangeId, StreamId};
use crate::model::state::TaskState;

/// Identity of one task: the stream it reads.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId {
    stream: StreamId,
}

impl TaskId {
    /// Creates a task id for the given stream.
    pub fn new(stream: StreamId) -> Self {
        Self { stream }
    }

    /// Returns the stream this task reads.
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task({})", self.stream)
    }
}

/// One stream's read progress: identity plus current [`TaskState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    state: TaskState,
}

impl Task {
    /// Creates a task at the given initial state.
    pub fn new(id: TaskId, state: TaskState) -> Self {
        Self { id, state }
    }

    /// Returns the task identity.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the current read progress.
    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Returns a new task with the given state.
    pub fn with_state(&self, state: TaskState) -> Self {
        Self {
            id: self.id.clone(),
            state,
        }
    }

    /// Returns a new task recording `id` as the last consumed change.
    pub fn update_state(&self, id: ChangeId) -> Self {
        self.with_state(self.state.with_consumed(id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::model::change::ChangeTime;

    #[test]
    fn update_state_leaves_original_untouched() {
        let task = Task::new(
            TaskId::new(StreamId::new([9u8])),
            TaskState::new(
                DateTime::from_timestamp_millis(0).unwrap(),
                DateTime::from_timestamp_millis(1_000).unwrap(),
            ),
        );
        let id = ChangeId::new(StreamId::new([9u8]), ChangeTime::from_parts(500, 0));
        let updated = task.update_state(id.clone());

        assert_eq!(task.state().last_consumed(), None);
        assert_eq!(updated.state().last_consumed(), Some(&id));
        assert_eq!(updated.id(), task.id());
    }
}

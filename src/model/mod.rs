//! # Value model of the CDC runtime.
//!
//! This module provides the immutable data types the engine passes between
//! actions:
//! - [`StreamId`], [`ChangeTime`], [`ChangeId`] — identity and ordering of log entries
//! - [`OperationKind`], [`Cell`], [`RawChange`] — the decoded-log-row surface
//! - [`TaskState`] — one task's window and consumed-change progress
//! - [`TaskId`], [`Task`] — the unit of work driven by the engine
//!
//! Everything here is a value: updates return new instances, so actions can
//! hand these types around without locks.

mod change;
mod state;
mod task;

pub use change::{
    Cell, ChangeId, ChangeTime, DELETED_COLUMN_PREFIX, OPERATION_COLUMN, OperationKind, RawChange,
    StreamId, TTL_COLUMN,
};
pub use state::TaskState;
pub use task::{Task, TaskId};

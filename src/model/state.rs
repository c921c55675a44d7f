//! # Read progress of one task through its stream.
//!
//! [`TaskState`] records the time window currently being read and the id of
//! the last change handed to the consumer. It is a plain immutable value:
//! every update produces a new state, which is what lets many tasks run
//! concurrently under one scheduler without any locking.
//!
//! ## Window contract
//! - `window_end > window_start`, always.
//! - Successive windows are contiguous and non-overlapping:
//!   [`moved_to_next_window`](TaskState::moved_to_next_window) produces a
//!   window starting exactly at the previous end.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::model::change::ChangeId;

/// Immutable read-progress snapshot: current window plus the last consumed
/// change id.
///
/// The runtime reports this value to the
/// [`Transport`](crate::source::Transport) as a checkpoint before each read,
/// so an external observer never sees progress lagging behind what has been
/// committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    last_consumed: Option<ChangeId>,
}

impl TaskState {
    /// Creates the initial state for a window with no consumed changes yet.
    ///
    /// # Panics
    /// Panics if `window_end <= window_start`.
    pub fn new(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        assert!(
            window_end > window_start,
            "window end {window_end} must be after window start {window_start}"
        );
        Self {
            window_start,
            window_end,
            last_consumed: None,
        }
    }

    /// Inclusive lower bound of the current window.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// Exclusive upper bound of the current window.
    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    /// Id of the last change handed to the consumer within this window.
    pub fn last_consumed(&self) -> Option<&ChangeId> {
        self.last_consumed.as_ref()
    }

    /// Returns a new state recording `id` as the last consumed change.
    pub fn with_consumed(&self, id: ChangeId) -> Self {
        Self {
            window_start: self.window_start,
            window_end: self.window_end,
            last_consumed: Some(id),
        }
    }

    /// Returns the state for the next window: both bounds advance by
    /// `window_size`, the consumed marker resets.
    ///
    /// The new window starts exactly at the old end, so no instant of log
    /// time is skipped or read twice across windows.
    pub fn moved_to_next_window(&self, window_size: Duration) -> Self {
        let size = TimeDelta::from_std(window_size).unwrap_or_else(|_| TimeDelta::zero());
        Self {
            window_start: self.window_end,
            window_end: self.window_end + size,
            last_consumed: None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.window_start.to_rfc3339(),
            self.window_end.to_rfc3339()
        )?;
        match &self.last_consumed {
            Some(id) => write!(f, " last_consumed={id}"),
            None => write!(f, " last_consumed=none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::change::{ChangeTime, StreamId};

    fn state(start_ms: i64, end_ms: i64) -> TaskState {
        TaskState::new(
            DateTime::from_timestamp_millis(start_ms).unwrap(),
            DateTime::from_timestamp_millis(end_ms).unwrap(),
        )
    }

    #[test]
    #[should_panic(expected = "must be after")]
    fn rejects_empty_window() {
        state(1_000, 1_000);
    }

    #[test]
    fn next_window_is_contiguous() {
        let s = state(0, 30_000);
        let next = s.moved_to_next_window(Duration::from_secs(30));
        assert_eq!(next.window_start(), s.window_end());
        assert_eq!(
            next.window_end(),
            s.window_end() + TimeDelta::milliseconds(30_000)
        );
    }

    #[test]
    fn next_window_clears_consumed_marker() {
        let id = ChangeId::new(StreamId::new([1u8]), ChangeTime::from_parts(10, 0));
        let s = state(0, 30_000).with_consumed(id.clone());
        assert_eq!(s.last_consumed(), Some(&id));

        let next = s.moved_to_next_window(Duration::from_secs(30));
        assert_eq!(next.last_consumed(), None);
    }

    #[test]
    fn with_consumed_keeps_window_bounds() {
        let s = state(0, 30_000);
        let id = ChangeId::new(StreamId::new([1u8]), ChangeTime::from_parts(10, 0));
        let updated = s.with_consumed(id);
        assert_eq!(updated.window_start(), s.window_start());
        assert_eq!(updated.window_end(), s.window_end());
    }
}

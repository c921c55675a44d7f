//! Which tasks are running right now.
//!
//! [`AliveTracker`] follows [`EventKind::TaskStarted`] /
//! [`EventKind::TaskStopped`] and keeps the set of task names in between.
//! Its one consumer is the supervisor's shutdown path: when the grace
//! period runs out, [`AliveTracker::snapshot`] names the tasks that never
//! made it to their next action boundary.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// In-memory set of running task names, fed by lifecycle events.
///
/// Registered as an ordinary [`Subscribe`] implementation; the supervisor
/// keeps a second handle for its synchronous shutdown snapshot.
#[derive(Default)]
pub struct AliveTracker {
    inner: RwLock<HashSet<String>>,
}

impl AliveTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of currently alive task names.
    pub fn snapshot(&self) -> Vec<String> {
        match self.inner.read() {
            Ok(g) => g.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn update(&self, name: &str, alive: bool) {
        let mut g = match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if alive {
            g.insert(name.to_string());
        } else {
            g.remove(name);
        }
    }
}

#[async_trait]
impl Subscribe for AliveTracker {
    async fn on_event(&self, event: &Event) {
        match event.kind {
            EventKind::TaskStarted => {
                if let Some(name) = &event.task {
                    self.update(name, true);
                }
            }
            EventKind::TaskStopped => {
                if let Some(name) = &event.task {
                    self.update(name, false);
                }
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "alive-tracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_started_and_stopped_tasks() {
        let tracker = AliveTracker::new();

        tracker
            .on_event(&Event::new(EventKind::TaskStarted).with_task("task(aa)"))
            .await;
        tracker
            .on_event(&Event::new(EventKind::TaskStarted).with_task("task(bb)"))
            .await;
        tracker
            .on_event(&Event::new(EventKind::TaskStopped).with_task("task(aa)"))
            .await;

        assert_eq!(tracker.snapshot(), vec!["task(bb)".to_string()]);
    }

    #[tokio::test]
    async fn ignores_unrelated_events() {
        let tracker = AliveTracker::new();
        tracker
            .on_event(&Event::new(EventKind::WindowAdvanced).with_task("task(aa)"))
            .await;
        assert!(tracker.snapshot().is_empty());
    }
}

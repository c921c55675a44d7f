//! Supervisor: runs a set of CDC tasks until the process is told to stop.
//!
//! The [`Supervisor`] ties the runtime together: it owns the event [`Bus`],
//! the [`SubscriberSet`] fan-out, and the shared [`WorkerConfig`], spawns
//! one [`TaskActor`] per assigned task, and turns an OS termination signal
//! into a cancellation with a bounded grace period.
//!
//! Which tasks exist is the caller's decision — stream discovery, generation
//! handling, and distribution across workers all happen outside this crate.
//! The supervisor runs exactly the tasks it is given, each forever.
//!
//! ```text
//! run(tasks):
//!   forward_events():   Bus ─► SubscriberSet::emit        (spawned listener)
//!   spawn_actors():     one TaskActor per task, child CancellationToken each
//!   then wait:
//!     all actors exit          ─► Ok           (only possible via cancellation)
//!     OS signal                ─► publish ShutdownRequested, cancel token,
//!                                 join_with_grace:
//!                                   all joined in time ─► AllStoppedWithin
//!                                   grace ran out      ─► GraceExceeded
//!                                                         + stuck-task snapshot
//! ```

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::actor::TaskActor;
use crate::core::config::{Config, WorkerConfig};
use crate::core::shutdown;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::model::Task;
use crate::subscribers::{AliveTracker, Subscribe, SubscriberSet};

/// Orchestrates task actors, event fan-out, and graceful shutdown.
pub struct Supervisor {
    /// Runtime settings (grace period, bus capacity).
    pub cfg: Config,
    /// Engine configuration shared by all task actors.
    pub worker: Arc<WorkerConfig>,
    /// Event bus shared with all actors.
    pub bus: Bus,
    /// Fan-out set delivering events to subscribers.
    pub subs: Arc<SubscriberSet>,
    /// Alive-tracker handle for the shutdown snapshot (also registered as a
    /// subscriber).
    pub alive: Arc<AliveTracker>,
}

impl Supervisor {
    /// Builds a supervisor over the given configs and subscribers.
    ///
    /// The `alive` tracker must be fed lifecycle events to stay accurate, so
    /// it is appended to `subscribers` unless the same instance is already
    /// among them.
    pub fn new(
        cfg: Config,
        worker: WorkerConfig,
        mut subscribers: Vec<Arc<dyn Subscribe>>,
        alive: Arc<AliveTracker>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());

        let registered = subscribers
            .iter()
            .any(|s| std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(&alive)));
        if !registered {
            subscribers.push(alive.clone());
        }

        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        Self {
            cfg,
            worker: Arc::new(worker),
            bus,
            subs,
            alive,
        }
    }

    /// Runs the given tasks until a termination signal arrives, then shuts
    /// down gracefully (possibly returning [`RuntimeError::GraceExceeded`]).
    ///
    /// CDC tasks never finish on their own — each actor loops until
    /// cancelled — so the signal path is the expected exit.
    pub async fn run(&self, tasks: Vec<Task>) -> Result<(), RuntimeError> {
        let token = CancellationToken::new();
        self.forward_events();

        let mut actors = JoinSet::new();
        self.spawn_actors(&mut actors, &token, tasks);
        self.supervise(&mut actors, &token).await
    }

    /// Spawns the listener that drains the bus into the subscriber set.
    fn forward_events(&self) {
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                subs.emit(&ev);
            }
        });
    }

    /// Starts one actor per task, each on a child of the runtime token.
    fn spawn_actors(
        &self,
        actors: &mut JoinSet<()>,
        runtime_token: &CancellationToken,
        tasks: Vec<Task>,
    ) {
        for task in tasks {
            let actor = TaskActor::new(Arc::clone(&self.worker), self.bus.clone(), task);
            actors.spawn(actor.run(runtime_token.child_token()));
        }
    }

    /// Blocks until the actors exit or a signal triggers the shutdown path.
    async fn supervise(
        &self,
        actors: &mut JoinSet<()>,
        runtime_token: &CancellationToken,
    ) -> Result<(), RuntimeError> {
        tokio::select! {
            _ = shutdown::shutdown_signal() => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                runtime_token.cancel();
                self.join_with_grace(actors).await
            }
            _ = async { while actors.join_next().await.is_some() {} } => Ok(()),
        }
    }

    /// Gives cancelled actors `cfg.grace` to finish their in-flight action.
    ///
    /// On timeout the remaining actors are abandoned, the stuck tasks are
    /// read off the alive tracker, and [`RuntimeError::GraceExceeded`] is
    /// returned.
    async fn join_with_grace(&self, actors: &mut JoinSet<()>) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let all_joined = async { while actors.join_next().await.is_some() {} };

        match tokio::time::timeout(grace, all_joined).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck = self.alive.snapshot();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::source::{Consumer, ReaderFactory, Transport};
    use crate::{CdcError, ChangeReader, RawChange, TaskId, TaskState};

    struct Idle;

    #[async_trait]
    impl ReaderFactory for Idle {
        async fn create_reader(&self, _task: &Task) -> Result<Box<dyn ChangeReader>, CdcError> {
            Err(CdcError::reader_open("idle"))
        }
    }

    #[async_trait]
    impl Consumer for Idle {
        async fn consume(&self, _task: &Task, _change: Box<dyn RawChange>) -> Result<(), CdcError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Transport for Idle {
        async fn set_state(&self, _task: &TaskId, _state: &TaskState) {}
        async fn move_state_to_next_window(&self, _task: &TaskId, _state: &TaskState) {}
    }

    fn worker() -> WorkerConfig {
        let idle = Arc::new(Idle);
        WorkerConfig::new(idle.clone(), idle.clone(), idle)
    }

    #[tokio::test]
    async fn missing_alive_tracker_is_registered() {
        let alive = Arc::new(AliveTracker::new());
        let sup = Supervisor::new(Config::default(), worker(), Vec::new(), alive);
        assert_eq!(sup.subs.len(), 1);
    }

    #[tokio::test]
    async fn shared_alive_tracker_is_not_duplicated() {
        let alive = Arc::new(AliveTracker::new());
        let subs: Vec<Arc<dyn Subscribe>> = vec![alive.clone()];
        let sup = Supervisor::new(Config::default(), worker(), subs, alive);
        assert_eq!(sup.subs.len(), 1);
    }
}

//! Broadcast channel carrying runtime events.
//!
//! Every actor and the supervisor publish into one shared [`Bus`]; the
//! supervisor's listener drains it and fans events out to the subscriber
//! set. Publishing never waits: the bus is a fixed-size ring over
//! [`tokio::sync::broadcast`], and receivers that fall more than the
//! capacity behind observe `RecvError::Lagged` and skip the overwritten
//! events. Nothing is persisted — an event published while no receiver is
//! attached is gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Handle to the shared event channel.
///
/// Cloning is cheap (the sender is `Arc`-backed internally); actors each
/// hold their own clone and publish concurrently.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to whoever is currently listening.
    ///
    /// Returns immediately; with no active receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Attaches a fresh receiver.
    ///
    /// The receiver sees only events published after this call, and skips
    /// ahead (with `RecvError::Lagged`) if it falls behind the ring.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

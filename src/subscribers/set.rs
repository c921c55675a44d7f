//! Fan-out delivery of events to subscribers.
//!
//! [`SubscriberSet`] hands each event to every subscriber without ever
//! awaiting one: the event goes into per-subscriber bounded queues, and a
//! worker task per subscriber drains its queue and calls `on_event`. Order
//! is FIFO within a subscriber; across subscribers there is none.
//!
//! Misbehaving subscribers are contained rather than propagated:
//! - a full (or closed) queue drops the event for that subscriber only and
//!   publishes [`EventKind::SubscriberOverflow`];
//! - a panic inside `on_event` is caught and published as
//!   [`EventKind::SubscriberPanicked`], and the worker continues.
//!
//! Faults raised *while handling a fault event* are written to stderr
//! instead of republished, which caps the cascade a permanently broken
//! subscriber could otherwise feed.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// One subscriber's delivery lane.
struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
}

/// Non-blocking fan-out over a fixed set of subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    faults: Bus,
}

fn is_fault(ev: &Event) -> bool {
    matches!(
        ev.kind,
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
    )
}

/// Best-effort extraction of a panic message from the unwind payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Drains one subscriber's queue, catching panics per event.
fn spawn_worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    faults: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
                .catch_unwind()
                .await;
            if let Err(panic) = handled {
                let info = panic_message(panic.as_ref());
                if is_fault(&ev) {
                    eprintln!(
                        "[streamvisor] subscriber '{}' panicked on fault event: {info}",
                        sub.name()
                    );
                } else {
                    faults.publish(Event::subscriber_panicked(sub.name(), info));
                }
            }
        }
    })
}

impl SubscriberSet {
    /// Builds the set, spawning one worker per subscriber.
    ///
    /// `faults` receives overflow/panic reports; the supervisor passes its
    /// main bus so they reach the remaining healthy subscribers.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, faults: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                queue: tx,
            });
            workers.push(spawn_worker(sub, rx, faults.clone()));
        }

        Self {
            lanes,
            workers,
            faults,
        }
    }

    /// Offers one event to every lane without waiting.
    ///
    /// Lanes that cannot take the event (queue full, worker gone) lose it
    /// and a [`EventKind::SubscriberOverflow`] report is issued in its
    /// place.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            let reason = match lane.queue.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "queue full",
                Err(mpsc::error::TrySendError::Closed(_)) => "worker closed",
            };
            if is_fault(&ev) {
                eprintln!(
                    "[streamvisor] subscriber '{}' dropped fault event: {reason}",
                    lane.name
                );
            } else {
                self.faults
                    .publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Closes every queue and waits for the workers to drain and exit.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Forwarder {
        tx: mpsc::UnboundedSender<EventKind>,
    }

    #[async_trait]
    impl Subscribe for Forwarder {
        async fn on_event(&self, event: &Event) {
            let _ = self.tx.send(event.kind);
        }

        fn name(&self) -> &'static str {
            "forwarder"
        }
    }

    /// Never finishes an event, so its queue stays occupied.
    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            std::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn events_reach_subscribers_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let faults = Bus::new(8);
        let set = SubscriberSet::new(vec![Arc::new(Forwarder { tx })], faults);

        set.emit(&Event::new(EventKind::TaskStarted));
        set.emit(&Event::new(EventKind::WindowAdvanced));
        set.shutdown().await;

        assert_eq!(rx.recv().await, Some(EventKind::TaskStarted));
        assert_eq!(rx.recv().await, Some(EventKind::WindowAdvanced));
    }

    #[tokio::test]
    async fn full_queue_reports_overflow_on_the_fault_bus() {
        let faults = Bus::new(8);
        let mut fault_rx = faults.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Stuck)], faults);

        // Worker has not run yet on the current-thread runtime, so the
        // single-slot queue fills on the first emit and rejects the second.
        set.emit(&Event::new(EventKind::TaskStarted));
        set.emit(&Event::new(EventKind::WindowAdvanced));

        let fault = fault_rx.try_recv().expect("overflow report");
        assert_eq!(fault.kind, EventKind::SubscriberOverflow);
        assert_eq!(fault.task.as_deref(), Some("stuck"));
        assert_eq!(fault.reason.as_deref(), Some("queue full"));
    }

    #[tokio::test]
    async fn panicking_subscriber_is_reported_and_survives() {
        let faults = Bus::new(8);
        let mut fault_rx = faults.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicker)], faults);

        set.emit(&Event::new(EventKind::TaskStarted));
        set.shutdown().await;

        let fault = fault_rx.try_recv().expect("panic report");
        assert_eq!(fault.kind, EventKind::SubscriberPanicked);
        assert_eq!(fault.task.as_deref(), Some("panicker"));
        assert!(fault.reason.as_deref().unwrap().contains("subscriber bug"));
    }
}

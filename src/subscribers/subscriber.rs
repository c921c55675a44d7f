//! The [`Subscribe`] extension point.
//!
//! Anything that wants to watch the runtime — log writers, metric exporters,
//! alerting glue — implements [`Subscribe`] and is handed to the supervisor.
//! The runtime gives every subscriber a bounded queue of its own, drained by
//! a dedicated worker task, so a slow or broken subscriber can never hold up
//! the engine or its peers: it only ever loses its *own* events.
//!
//! ```text
//! Bus ─► SubscriberSet ─► [queue] ─► worker ─► on_event(&Event)
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of runtime events.
///
/// Isolation per subscriber:
/// - events queue up in a bounded buffer ([`Self::queue_capacity`]) and are
///   processed in FIFO order by a dedicated worker task;
/// - when the buffer is full, new events are dropped for this subscriber
///   only and a [`SubscriberOverflow`](crate::EventKind::SubscriberOverflow)
///   is published;
/// - a panic in [`Self::on_event`] is caught, reported as
///   [`SubscriberPanicked`](crate::EventKind::SubscriberPanicked), and the
///   worker keeps going.
///
/// Implementations should stick to async I/O and swallow their own errors;
/// the runtime has nowhere to propagate them to.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Runs on the subscriber's worker task, never in the publisher's
    /// context, so it may await freely.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and in overflow/panic fault events.
    ///
    /// Defaults to `type_name::<Self>()`; override with something short
    /// ("metrics", "audit") when practical.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Requested queue depth for this subscriber (clamped to at least 1).
    ///
    /// Sizing is a throughput/memory trade: a metrics sink that only counts
    /// events can live with a small queue, while anything doing network I/O
    /// per event wants room to absorb bursts.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

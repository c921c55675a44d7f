//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor and the
//! per-task action loops. Failure logging required by the engine (task
//! identity, state, attempt on every reader/consume failure) is expressed as
//! events on this bus; what happens to them — stdout, metrics, alerts — is
//! up to the subscribers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `TaskActor`, the action state machine,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the supervisor's forwarding listener, which drains the
//!   bus into the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

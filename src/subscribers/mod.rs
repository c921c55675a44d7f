//! Observability surface of the runtime.
//!
//! Everything the engine has to say — failures with task/state/attempt,
//! window progress, lifecycle, shutdown — arrives here as events, and this
//! module decides who hears them:
//!
//! - [`Subscribe`] is the hook applications implement;
//! - [`SubscriberSet`] fans events out, one bounded queue and worker per
//!   subscriber, with overflow and panic containment;
//! - [`AliveTracker`] is the built-in subscriber backing the supervisor's
//!   stuck-task snapshot;
//! - [`LogWriter`] (feature `logging`) prints events to stdout.
//!
//! A custom subscriber is a few lines:
//! ```no_run
//! use streamvisor::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::ConsumeFailed) {
//!             // bump a counter, page someone, ...
//!         }
//!     }
//! }
//! ```

mod alive;
#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

pub use alive::AliveTracker;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

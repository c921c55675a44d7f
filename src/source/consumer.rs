//! # Application hook receiving every delivered change.

use async_trait::async_trait;

use crate::error::CdcError;
use crate::model::{RawChange, Task};

/// Application callback invoked once per delivered change.
///
/// ## Delivery semantics
/// - Called with the task **as of before this change**: `task.state()` does
///   not yet record the change being delivered. The engine advances its own
///   bookkeeping only after `consume` returns `Ok`.
/// - A failure reverts the task to its last committed progress and re-reads
///   the current window from its start, so every change of the window up to
///   the failure point is delivered again. Implementations must therefore be
///   idempotent with respect to re-delivery within a window.
/// - Calls are strictly sequential per task; distinct tasks are delivered
///   concurrently with no cross-task ordering guarantee.
#[async_trait]
pub trait Consumer: Send + Sync + 'static {
    /// Handles one change. Returning an error triggers backoff and window
    /// re-delivery.
    async fn consume(&self, task: &Task, change: Box<dyn RawChange>) -> Result<(), CdcError>;
}

//! Plain-text event logging to stdout.
//!
//! [`LogWriter`] renders each event as one bracketed line, e.g.:
//!
//! ```text
//! [started] task=task(0aff01) state=[2026-01-01T00:00:00+00:00, 2026-01-01T00:00:30+00:00) last_consumed=none
//! [reader-open-failed] task=task(0aff01) attempt=0 err="connection refused"
//! [backoff] task=task(0aff01) delay_ms=100 after_attempt=0 err="connection refused"
//! [window-drained] task=task(0aff01) after_attempts=2
//! [window-advanced] task=task(0aff01) state=[...]
//! [stopped] task=task(0aff01)
//! ```
//!
//! Handy while developing against a new source or consumer; production
//! deployments will want their own [`Subscribe`] impl feeding whatever
//! logging or metrics pipeline they already run.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Stdout logger behind the `logging` cargo feature.
#[derive(Default)]
pub struct LogWriter;

fn fmt_opt(value: &Option<std::sync::Arc<str>>) -> &str {
    value.as_deref().unwrap_or("?")
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskStarted => {
                println!(
                    "[started] task={} state={}",
                    fmt_opt(&e.task),
                    fmt_opt(&e.state)
                );
            }
            EventKind::TaskStopped => {
                println!("[stopped] task={}", fmt_opt(&e.task));
            }
            EventKind::ReaderOpenFailed => {
                println!(
                    "[reader-open-failed] task={} state={} attempt={:?} err={:?}",
                    fmt_opt(&e.task),
                    fmt_opt(&e.state),
                    e.attempt,
                    e.reason
                );
            }
            EventKind::ChangeReadFailed => {
                println!(
                    "[read-failed] task={} state={} attempt={:?} err={:?}",
                    fmt_opt(&e.task),
                    fmt_opt(&e.state),
                    e.attempt,
                    e.reason
                );
            }
            EventKind::ConsumeFailed => {
                println!(
                    "[consume-failed] task={} state={} attempt={:?} err={:?}",
                    fmt_opt(&e.task),
                    fmt_opt(&e.state),
                    e.attempt,
                    e.reason
                );
            }
            EventKind::BackoffScheduled => {
                println!(
                    "[backoff] task={} delay_ms={:?} after_attempt={:?} err={:?}",
                    fmt_opt(&e.task),
                    e.delay_ms,
                    e.attempt,
                    e.reason
                );
            }
            EventKind::WindowDrained => {
                println!(
                    "[window-drained] task={} after_attempts={:?}",
                    fmt_opt(&e.task),
                    e.attempt
                );
            }
            EventKind::WindowAdvanced => {
                println!(
                    "[window-advanced] task={} state={}",
                    fmt_opt(&e.task),
                    fmt_opt(&e.state)
                );
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={:?}",
                    fmt_opt(&e.task),
                    e.reason
                );
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={} reason={:?}",
                    fmt_opt(&e.task),
                    e.reason
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

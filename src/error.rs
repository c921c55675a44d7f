//! Error types used by the streamvisor runtime and its collaborators.
//!
//! This module defines two error enums:
//!
//! - [`CdcError`] — failures surfaced by the pluggable collaborators
//!   (reader factory, reader, consumer). The engine treats every variant as
//!   transient: it logs, backs off, and retries without bound.
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself.
//!
//! Both types provide `as_label` / `as_message` helpers for logging and
//! metrics.

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Failures observed inside the engine's read-consume loop.
///
/// There is deliberately no fatal category and no retry bound: a failure of
/// any variant sends the task back to `ReadNewWindow` with an incremented
/// attempt counter and a backoff delay. A permanently failing collaborator
/// therefore stalls its task forever while emitting failure events — that is
/// the accepted contract, not a defect.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CdcError {
    /// Opening a reader for the task's current window failed.
    #[error("failed to open window reader: {error}")]
    ReaderOpen {
        /// The underlying error message.
        error: String,
    },

    /// Pulling the next change from an open reader failed.
    #[error("failed to read next change: {error}")]
    Read {
        /// The underlying error message.
        error: String,
    },

    /// The application consumer rejected a delivered change.
    #[error("failed to consume change: {error}")]
    Consume {
        /// The underlying error message.
        error: String,
    },
}

impl CdcError {
    /// Wraps a reader-creation failure.
    pub fn reader_open(error: impl Display) -> Self {
        CdcError::ReaderOpen {
            error: error.to_string(),
        }
    }

    /// Wraps a read failure.
    pub fn read(error: impl Display) -> Self {
        CdcError::Read {
            error: error.to_string(),
        }
    }

    /// Wraps a consume failure.
    pub fn consume(error: impl Display) -> Self {
        CdcError::Consume {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use streamvisor::CdcError;
    ///
    /// let err = CdcError::read("connection reset");
    /// assert_eq!(err.as_label(), "read_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CdcError::ReaderOpen { .. } => "reader_open_failed",
            CdcError::Read { .. } => "read_failed",
            CdcError::Consume { .. } => "consume_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CdcError::ReaderOpen { error } => format!("reader open: {error}"),
            CdcError::Read { error } => format!("read: {error}"),
            CdcError::Consume { error } => format!("consume: {error}"),
        }
    }
}

/// # Errors produced by the streamvisor runtime.
///
/// These represent failures in the orchestration layer itself, such as a
/// shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some tasks remained stuck and had to be force-terminated.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// List of task names that did not shut down in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use streamvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
        }
    }
}

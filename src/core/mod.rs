//! Runtime core: the task engine and its orchestration.
//!
//! This module contains the embedded implementation of the streamvisor
//! runtime. The action state machine is the heart of the crate; everything
//! else drives or configures it.
//!
//! Modules:
//! - [`action`]: the read-consume-advance state machine for one task;
//! - [`actor`]: runs one task's action loop until cancellation;
//! - [`supervisor`]: orchestrates actors, event fan-out, graceful shutdown;
//! - [`config`]: the engine and runtime configuration bundles;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod action;
mod actor;
mod config;
mod shutdown;
mod supervisor;

pub use action::TaskAction;
pub use actor::TaskActor;
pub use config::{Config, DEFAULT_CONFIDENCE_WINDOW_SIZE, DEFAULT_WINDOW_SIZE, WorkerConfig};
pub use supervisor::Supervisor;

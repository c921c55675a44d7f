//! Termination-signal plumbing for the supervisor.
//!
//! CDC tasks run until told otherwise, so process lifetime is governed by
//! the OS: [`shutdown_signal`] resolves once the process is asked to stop.
//! On Unix that covers `SIGINT`, `SIGTERM` (systemd/Kubernetes) and
//! `SIGQUIT`; on other platforms only Ctrl-C is available.

/// Resolves when a termination request reaches the process.
///
/// Listeners are registered per call; a registration failure surfaces as
/// `Err` before any waiting starts.
#[cfg(unix)]
pub async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
        _ = quit.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    Ok(())
}

/// Resolves when a termination request reaches the process.
#[cfg(not(unix))]
pub async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

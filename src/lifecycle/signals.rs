//! OS signal handling.
//!
//! SIGTERM and Ctrl-C request shutdown; SIGHUP requests a configuration
//! reload.

use std::io;

/// What the process was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Reload,
    Shutdown,
}

/// Registered signal streams.
pub struct Signals {
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Signals {
    /// Register handlers. Must be called from within a Tokio runtime.
    pub fn new() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                hangup: signal(SignalKind::hangup())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next signal.
    pub async fn recv(&mut self) -> LifecycleEvent {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.hangup.recv() => LifecycleEvent::Reload,
                _ = self.terminate.recv() => LifecycleEvent::Shutdown,
                _ = tokio::signal::ctrl_c() => LifecycleEvent::Shutdown,
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            LifecycleEvent::Shutdown
        }
    }
}

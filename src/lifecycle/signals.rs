//! OS signal handling.
//!
//! Translates SIGINT and SIGTERM into [`Trigger`]s for the coordinator. On
//! non-unix targets only Ctrl+C is observed.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{error, info};
use tokio::task::JoinHandle;

use crate::error_handling::ShutdownError;

use super::coordinator::Lifecycle;
use super::state::Trigger;

/// Listens for the termination signals the coordinator reacts to.
struct TriggerListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TriggerListener {
    #[cfg(unix)]
    fn new() -> Result<Self, ShutdownError> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt =
            signal(SignalKind::interrupt()).map_err(|source| ShutdownError::SignalInstall {
                signal: "SIGINT",
                source,
            })?;
        let terminate =
            signal(SignalKind::terminate()).map_err(|source| ShutdownError::SignalInstall {
                signal: "SIGTERM",
                source,
            })?;
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    #[cfg(not(unix))]
    fn new() -> Result<Self, ShutdownError> {
        Ok(Self {})
    }

    /// Waits for the next signal. `None` once the signal streams are closed.
    #[cfg(unix)]
    async fn recv(&mut self) -> Option<Trigger> {
        tokio::select! {
            received = self.interrupt.recv() => received.map(|()| Trigger::Interrupt),
            received = self.terminate.recv() => received.map(|()| Trigger::Terminate),
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Option<Trigger> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(Trigger::Interrupt),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                None
            }
        }
    }
}

impl Lifecycle {
    /// Installs the SIGINT and SIGTERM handlers for this coordinator.
    ///
    /// Spawns a listener task; each signal is handed to
    /// [`Lifecycle::handle_trigger`] on its own task, so a signal arriving
    /// during the drain is logged and ignored rather than queued. Must be
    /// called from inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `ShutdownError::AlreadyInstalled` on a second call.
    /// - `ShutdownError::SignalInstall` if a listener cannot be registered.
    pub fn install_signal_handlers(self: &Arc<Self>) -> Result<JoinHandle<()>, ShutdownError> {
        if self.handlers_installed.swap(true, Ordering::SeqCst) {
            return Err(ShutdownError::AlreadyInstalled);
        }

        let mut listener = match TriggerListener::new() {
            Ok(listener) => listener,
            Err(e) => {
                self.handlers_installed.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        info!("Installed SIGINT/SIGTERM handlers");

        let lifecycle = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(trigger) = listener.recv().await {
                let lifecycle = Arc::clone(&lifecycle);
                tokio::spawn(async move {
                    lifecycle.handle_trigger(trigger).await;
                });
            }
            error!("Signal listener stopped; shutdown triggers are no longer observed");
        }))
    }
}

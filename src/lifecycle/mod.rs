//! Process lifecycle: save draining and graceful shutdown.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Lifecycle::new → add(descriptor)... → install_signal_handlers
//!
//! SIGINT / SIGTERM (signals.rs):
//!     handle_trigger → run every save action in order → exit 0 (or 1 on failure)
//!
//! Work finished on its own (coordinator.rs):
//!     finish → emergency flush of pending items → exit 0
//! ```
//!
//! The sequence runs at most once per `Lifecycle`: the first accepted trigger
//! moves the state from `Idle` to `Draining`. Later triggers are ignored but
//! wait for the running sequence to finish before returning.

mod coordinator;
mod descriptor;
mod exit;
mod signals;
mod state;

pub use crate::config::{DrainPolicy, LifecycleConfig};
pub use coordinator::{register_shutdown, DrainReport, Lifecycle};
pub use descriptor::{PendingItems, SaveDescriptor, SaveFuture};
pub use exit::{ProcessExit, ProcessExitHandle};
pub use state::{LifecycleState, Trigger};

//! Coordinator state machine and termination triggers.

use std::fmt;

/// Where the coordinator is in its one-shot shutdown sequence.
///
/// Transitions only go forward: `Idle -> Draining -> Done`. A trigger is
/// accepted only while `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Registering descriptors, no trigger seen yet.
    Idle,
    /// A trigger was accepted and the drain or flush is running.
    Draining,
    /// The sequence finished (successfully or not).
    Done,
}

impl LifecycleState {
    pub(crate) const IDLE: u8 = 0;
    pub(crate) const DRAINING: u8 = 1;
    pub(crate) const DONE: u8 = 2;

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            Self::IDLE => LifecycleState::Idle,
            Self::DRAINING => LifecycleState::Draining,
            _ => LifecycleState::Done,
        }
    }
}

/// An external event that starts the shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// SIGINT (Ctrl+C).
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// The application finished its work and is about to exit.
    NormalExit,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Interrupt => "SIGINT",
            Trigger::Terminate => "SIGTERM",
            Trigger::NormalExit => "normal exit",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

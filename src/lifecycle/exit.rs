//! Process termination seam.

/// Terminates the process with an exit code.
///
/// The coordinator calls this exactly once, after the drain or flush. Tests
/// substitute an implementation that records the code instead of exiting.
pub trait ProcessExit: Send + Sync {
    fn exit(&self, code: i32);
}

/// Exits the real process via `std::process::exit`, flushing the logger first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExitHandle;

impl ProcessExit for ProcessExitHandle {
    fn exit(&self, code: i32) {
        log::logger().flush();
        std::process::exit(code);
    }
}

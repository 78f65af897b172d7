//! The shutdown coordinator.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::config::{DrainPolicy, LifecycleConfig, EXIT_CODE_FAILURE, EXIT_CODE_SUCCESS};
use crate::error_handling::{FlushError, ShutdownError};

use super::descriptor::{SaveAction, SaveDescriptor};
use super::exit::{ProcessExit, ProcessExitHandle};
use super::state::{LifecycleState, Trigger};

/// Outcome of one drain.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Names of the actions that completed, in execution order.
    pub completed: Vec<String>,
    /// Failures in execution order. At most one under `DrainPolicy::FailFast`.
    pub failures: Vec<ShutdownError>,
    /// Descriptors never invoked because an earlier one failed.
    pub skipped: usize,
}

impl DrainReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 when every invoked action completed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            EXIT_CODE_SUCCESS
        } else {
            EXIT_CODE_FAILURE
        }
    }
}

/// Process lifecycle coordinator.
///
/// Holds the ordered registry of save descriptors and runs the shutdown
/// sequence at most once. Build one at startup, register descriptors with
/// [`Lifecycle::add`], then call [`Lifecycle::install_signal_handlers`] and,
/// when the work finishes on its own, [`Lifecycle::finish`].
///
/// Save actions run sequentially in registration order, each bounded by
/// `LifecycleConfig::action_timeout`.
pub struct Lifecycle {
    config: LifecycleConfig,
    registry: Mutex<Vec<SaveDescriptor>>,
    state: AtomicU8,
    pub(super) handlers_installed: AtomicBool,
    exit: Arc<dyn ProcessExit>,
    // Flips to true once the accepted sequence (and its exit call) is over
    finished: watch::Sender<bool>,
}

impl Lifecycle {
    /// Creates a coordinator that terminates through `exit`.
    pub fn new(config: LifecycleConfig, exit: Arc<dyn ProcessExit>) -> Self {
        Self {
            config,
            registry: Mutex::new(Vec::new()),
            state: AtomicU8::new(LifecycleState::IDLE),
            handlers_installed: AtomicBool::new(false),
            exit,
            finished: watch::channel(false).0,
        }
    }

    /// Creates a coordinator bound to the real process exit.
    pub fn for_process(config: LifecycleConfig) -> Self {
        Self::new(config, Arc::new(ProcessExitHandle))
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of registered descriptors not yet drained.
    pub fn len(&self) -> usize {
        self.lock_registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a descriptor to the registry.
    ///
    /// # Errors
    ///
    /// Returns `ShutdownError::RegistryClosed` once a trigger has been accepted;
    /// the descriptor is dropped without running.
    pub fn add(&self, descriptor: SaveDescriptor) -> Result<(), ShutdownError> {
        let mut registry = self.lock_registry();
        if self.state() != LifecycleState::Idle {
            warn!(
                "Shutdown already started, not registering save action '{}'",
                descriptor.name()
            );
            return Err(ShutdownError::RegistryClosed(descriptor.name().to_string()));
        }
        debug!(
            "Registered save action '{}' (position {})",
            descriptor.name(),
            registry.len()
        );
        registry.push(descriptor);
        Ok(())
    }

    /// Runs every registered save action once, in order.
    ///
    /// Returns `None` immediately, without invoking anything, if a trigger was
    /// already accepted. Does not exit the process; see
    /// [`Lifecycle::handle_trigger`].
    pub async fn run_shutdown(&self, trigger: Trigger) -> Option<DrainReport> {
        if !self.try_begin() {
            debug!("Ignoring {}: shutdown already started", trigger);
            return None;
        }
        let report = self.drain().await;
        self.mark_done();
        Some(report)
    }

    /// Handles a termination trigger: drain, log the outcome, exit.
    ///
    /// Exits with 0 when every action completed and 1 otherwise. A repeated
    /// trigger is logged and ignored, but only returns once the sequence
    /// already in progress is over.
    pub async fn handle_trigger(&self, trigger: Trigger) {
        info!("Received {}. Shutting down gracefully...", trigger);
        if !self.try_begin() {
            warn!("Shutdown already in progress, ignoring {}", trigger);
            self.wait_until_done().await;
            return;
        }
        let report = self.drain().await;

        if report.is_success() {
            info!(
                "Process exited gracefully ({} save action(s) completed)",
                report.completed.len()
            );
        } else {
            error!(
                "Error during shutdown: {} save action(s) failed, {} not attempted",
                report.failures.len(),
                report.skipped
            );
        }
        self.exit.exit(report.exit_code());
        self.mark_done();
    }

    /// Normal-exit path: flush leftover pending items and exit with 0.
    ///
    /// Save actions are not invoked here. A failed flush is logged and does
    /// not change the exit code.
    ///
    /// If a signal already started the drain, nothing is flushed and this
    /// waits for that drain (and its exit call) instead, so the caller cannot
    /// return from `main` while saves are still running.
    pub async fn finish(&self) {
        let trigger = Trigger::NormalExit;
        info!("Received {}. Shutting down gracefully...", trigger);
        if !self.try_begin() {
            warn!("Shutdown already in progress, ignoring {}", trigger);
            self.wait_until_done().await;
            return;
        }

        match self.emergency_flush().await {
            Ok(Some(path)) => info!("Unsaved items saved to {}", path.display()),
            Ok(None) => debug!("No unsaved items to flush"),
            Err(e) => error!("Emergency flush failed: {}", e),
        }

        self.exit.exit(EXIT_CODE_SUCCESS);
        self.mark_done();
    }

    /// Writes the first non-empty `pending_items` collection to the flush path.
    ///
    /// Returns `Ok(None)` without touching the filesystem when nothing is
    /// pending.
    pub async fn emergency_flush(&self) -> Result<Option<PathBuf>, FlushError> {
        let json = {
            let registry = self.lock_registry();
            let pending = registry.iter().find_map(|descriptor| {
                descriptor
                    .pending_items()
                    .filter(|items| items.pending_count() > 0)
                    .map(|items| (descriptor.name(), items))
            });
            match pending {
                Some((name, items)) => {
                    info!(
                        "Unsaved items detected in '{}' ({} pending). Saving before exit...",
                        name,
                        items.pending_count()
                    );
                    items.to_pretty_json()?
                }
                None => return Ok(None),
            }
        };

        let path = self.config.flush_path.clone();
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| FlushError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(Some(path))
    }

    fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(
                LifecycleState::IDLE,
                LifecycleState::DRAINING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    fn mark_done(&self) {
        self.state.store(LifecycleState::DONE, Ordering::SeqCst);
        self.finished.send_replace(true);
    }

    /// Resolves once the accepted sequence is over; immediately if it already is.
    async fn wait_until_done(&self) {
        let mut finished = self.finished.subscribe();
        // Only errors when the sender is dropped, and `self` owns it
        let _ = finished.wait_for(|done| *done).await;
    }

    fn lock_registry(&self) -> MutexGuard<'_, Vec<SaveDescriptor>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn drain(&self) -> DrainReport {
        // The lock is released before the first await
        let descriptors = std::mem::take(&mut *self.lock_registry());
        let mut report = DrainReport::default();

        if descriptors.is_empty() {
            info!("No save actions registered");
            return report;
        }

        let total = descriptors.len();
        info!("Running {} save action(s) before exit", total);

        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let (name, action) = descriptor.into_action();
            debug!("Running save action '{}' ({}/{})", name, index + 1, total);

            match run_action(&name, action, self.config.action_timeout).await {
                Ok(()) => {
                    info!("Save action '{}' completed", name);
                    report.completed.push(name);
                }
                Err(e) => {
                    error!("{}", e);
                    report.failures.push(e);
                    if self.config.drain_policy == DrainPolicy::FailFast {
                        report.skipped = total - index - 1;
                        break;
                    }
                }
            }
        }

        report
    }
}

/// Invokes one action, converting errors, panics and timeouts into `ShutdownError`.
async fn run_action(
    name: &str,
    action: SaveAction,
    timeout: Duration,
) -> Result<(), ShutdownError> {
    // A panic while building the future counts the same as one while polling it
    let future = std::panic::catch_unwind(AssertUnwindSafe(action)).map_err(|payload| {
        ShutdownError::ActionPanicked {
            name: name.to_string(),
            message: panic_message(payload.as_ref()),
        }
    })?;

    match tokio::time::timeout(timeout, AssertUnwindSafe(future).catch_unwind()).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(source))) => Err(ShutdownError::ActionFailed {
            name: name.to_string(),
            source,
        }),
        Ok(Err(payload)) => Err(ShutdownError::ActionPanicked {
            name: name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
        Err(_) => Err(ShutdownError::ActionTimedOut {
            name: name.to_string(),
            timeout,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builds a process-bound coordinator, registers `descriptors` in order and
/// installs the SIGINT/SIGTERM handlers.
///
/// Call once per process, from inside a Tokio runtime.
///
/// # Errors
///
/// Returns `ShutdownError::SignalInstall` if a signal listener cannot be
/// registered. The process should treat this as a fatal startup error.
pub fn register_shutdown(
    descriptors: Vec<SaveDescriptor>,
    config: LifecycleConfig,
) -> Result<Arc<Lifecycle>, ShutdownError> {
    let lifecycle = Arc::new(Lifecycle::for_process(config));
    for descriptor in descriptors {
        lifecycle.add(descriptor)?;
    }
    lifecycle.install_signal_handlers()?;
    Ok(lifecycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Records exit codes instead of terminating the test process.
    #[derive(Default)]
    struct RecordingExit {
        codes: Mutex<Vec<i32>>,
    }

    impl ProcessExit for RecordingExit {
        fn exit(&self, code: i32) {
            self.codes.lock().unwrap().push(code);
        }
    }

    impl RecordingExit {
        fn codes(&self) -> Vec<i32> {
            self.codes.lock().unwrap().clone()
        }
    }

    fn test_lifecycle(config: LifecycleConfig) -> (Lifecycle, Arc<RecordingExit>) {
        let exit = Arc::new(RecordingExit::default());
        (Lifecycle::new(config, exit.clone()), exit)
    }

    /// A descriptor that appends its index to `log` when run.
    fn recording(index: usize, log: &Arc<Mutex<Vec<usize>>>) -> SaveDescriptor {
        let log = Arc::clone(log);
        SaveDescriptor::new(format!("save-{}", index), index, move |i| async move {
            log.lock().unwrap().push(i);
            Ok(())
        })
    }

    fn failing(index: usize, log: &Arc<Mutex<Vec<usize>>>) -> SaveDescriptor {
        let log = Arc::clone(log);
        SaveDescriptor::new(format!("save-{}", index), index, move |i| async move {
            log.lock().unwrap().push(i);
            Err(anyhow::anyhow!("write failed"))
        })
    }

    #[tokio::test]
    async fn test_all_actions_run_in_registration_order() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            lifecycle.add(recording(i, &log)).unwrap();
        }
        assert_eq!(lifecycle.len(), 5);

        lifecycle.handle_trigger(Trigger::Interrupt).await;

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(exit.codes(), vec![0]);
        assert_eq!(lifecycle.state(), LifecycleState::Done);
        assert!(lifecycle.is_empty());
    }

    #[tokio::test]
    async fn test_empty_registry_exits_zero() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        lifecycle.handle_trigger(Trigger::Terminate).await;
        assert_eq!(exit.codes(), vec![0]);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_failure() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        lifecycle.add(recording(0, &log)).unwrap();
        lifecycle.add(recording(1, &log)).unwrap();
        lifecycle.add(failing(2, &log)).unwrap();
        lifecycle.add(recording(3, &log)).unwrap();
        lifecycle.add(recording(4, &log)).unwrap();

        lifecycle.handle_trigger(Trigger::Interrupt).await;

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(exit.codes(), vec![1]);
    }

    #[tokio::test]
    async fn test_fail_fast_report_counts_skipped() {
        let (lifecycle, _exit) = test_lifecycle(LifecycleConfig::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        lifecycle.add(failing(0, &log)).unwrap();
        lifecycle.add(recording(1, &log)).unwrap();
        lifecycle.add(recording(2, &log)).unwrap();

        let report = lifecycle.run_shutdown(Trigger::Interrupt).await.unwrap();

        assert!(report.completed.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].action_name(), Some("save-0"));
        assert_eq!(report.skipped, 2);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_best_effort_runs_everything() {
        let config = LifecycleConfig {
            drain_policy: DrainPolicy::BestEffort,
            ..Default::default()
        };
        let (lifecycle, exit) = test_lifecycle(config);
        let log = Arc::new(Mutex::new(Vec::new()));
        lifecycle.add(failing(0, &log)).unwrap();
        lifecycle.add(recording(1, &log)).unwrap();
        lifecycle.add(failing(2, &log)).unwrap();
        lifecycle.add(recording(3, &log)).unwrap();

        let report = lifecycle.run_shutdown(Trigger::Terminate).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(report.completed, vec!["save-1", "save-3"]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.exit_code(), 1);
        // run_shutdown alone never exits
        assert!(exit.codes().is_empty());
    }

    #[tokio::test]
    async fn test_second_trigger_invokes_nothing() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        lifecycle
            .add(SaveDescriptor::new("count", (), move |_| async move {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        lifecycle.handle_trigger(Trigger::Interrupt).await;
        lifecycle.handle_trigger(Trigger::Interrupt).await;
        lifecycle.handle_trigger(Trigger::Terminate).await;
        assert!(lifecycle.run_shutdown(Trigger::Interrupt).await.is_none());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(exit.codes(), vec![0]);
    }

    #[tokio::test]
    async fn test_racing_triggers_drain_once() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        lifecycle
            .add(SaveDescriptor::new("slow", (), move |_| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        tokio::join!(
            lifecycle.handle_trigger(Trigger::Interrupt),
            lifecycle.handle_trigger(Trigger::Terminate),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(exit.codes(), vec![0]);
    }

    #[tokio::test]
    async fn test_delayed_action_completes_before_exit() {
        struct CheckingExit {
            saved: Arc<AtomicBool>,
            saved_at_exit: Mutex<Option<bool>>,
        }
        impl ProcessExit for CheckingExit {
            fn exit(&self, _code: i32) {
                *self.saved_at_exit.lock().unwrap() = Some(self.saved.load(Ordering::SeqCst));
            }
        }

        let saved = Arc::new(AtomicBool::new(false));
        let exit = Arc::new(CheckingExit {
            saved: Arc::clone(&saved),
            saved_at_exit: Mutex::new(None),
        });
        let lifecycle = Lifecycle::new(LifecycleConfig::default(), exit.clone());

        let saved_clone = Arc::clone(&saved);
        lifecycle
            .add(SaveDescriptor::new("x", "x", move |_| async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                saved_clone.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        lifecycle.handle_trigger(Trigger::Interrupt).await;
        assert_eq!(*exit.saved_at_exit.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_synchronous_panic_is_contained() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = Arc::clone(&first);
        lifecycle
            .add(SaveDescriptor::new("first", (), move |_| {
                first_clone.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            }))
            .unwrap();

        let second_clone = Arc::clone(&second);
        lifecycle
            .add(SaveDescriptor::new(
                "second",
                (),
                move |_| -> futures::future::Ready<anyhow::Result<()>> {
                    second_clone.fetch_add(1, Ordering::SeqCst);
                    panic!("serializer exploded");
                },
            ))
            .unwrap();

        let report = lifecycle.run_shutdown(Trigger::Interrupt).await.unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(report.completed, vec!["first"]);
        match &report.failures[..] {
            [ShutdownError::ActionPanicked { name, message }] => {
                assert_eq!(name, "second");
                assert_eq!(message, "serializer exploded");
            }
            other => panic!("unexpected failures: {:?}", other),
        }
        assert_eq!(report.exit_code(), 1);
        assert!(exit.codes().is_empty());
    }

    #[tokio::test]
    async fn test_panic_while_polling_is_contained() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        lifecycle
            .add(SaveDescriptor::new("poll", 3usize, |n| async move {
                tokio::task::yield_now().await;
                if n > 2 {
                    panic!("index {} out of range", n);
                }
                Ok(())
            }))
            .unwrap();

        lifecycle.handle_trigger(Trigger::Interrupt).await;
        assert_eq!(exit.codes(), vec![1]);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let config = LifecycleConfig {
            action_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let (lifecycle, _exit) = test_lifecycle(config);
        let log = Arc::new(Mutex::new(Vec::new()));
        lifecycle
            .add(SaveDescriptor::new("hung", (), |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }))
            .unwrap();
        lifecycle.add(recording(1, &log)).unwrap();

        let started = std::time::Instant::now();
        let report = lifecycle.run_shutdown(Trigger::Terminate).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(
            report.failures[..],
            [ShutdownError::ActionTimedOut { .. }]
        ));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_add_after_trigger_is_rejected() {
        let (lifecycle, _exit) = test_lifecycle(LifecycleConfig::default());
        lifecycle.run_shutdown(Trigger::Interrupt).await.unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let result = lifecycle.add(recording(0, &log));
        assert!(matches!(result, Err(ShutdownError::RegistryClosed(name)) if name == "save-0"));
        assert!(lifecycle.is_empty());
    }

    #[tokio::test]
    async fn test_emergency_flush_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsavedPlaces.json");
        let config = LifecycleConfig {
            flush_path: path.clone(),
            ..Default::default()
        };
        let (lifecycle, exit) = test_lifecycle(config);

        let a = serde_json::json!({"id": "a", "name": "Café Ñandú", "tags": ["x", 1, null]});
        let b = serde_json::json!({"id": "b", "nested": {"rating": 4.5}});
        let empty: Arc<Mutex<Vec<serde_json::Value>>> = Arc::new(Mutex::new(Vec::new()));
        let unsaved = Arc::new(Mutex::new(vec![a.clone(), b.clone()]));
        lifecycle
            .add(SaveDescriptor::new("empty", (), |_| async { Ok(()) }).with_pending_items(empty))
            .unwrap();
        lifecycle
            .add(
                SaveDescriptor::new("places", (), |_| async { Ok(()) })
                    .with_pending_items(unsaved),
            )
            .unwrap();

        lifecycle.finish().await;

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, serde_json::json!([a, b]));
        assert!(written.contains("\n  {"), "expected 2-space indent");
        assert_eq!(exit.codes(), vec![0]);
    }

    #[tokio::test]
    async fn test_finish_without_pending_items_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsavedPlaces.json");
        let config = LifecycleConfig {
            flush_path: path.clone(),
            ..Default::default()
        };
        let (lifecycle, exit) = test_lifecycle(config);
        let empty: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        lifecycle
            .add(SaveDescriptor::new("places", (), |_| async { Ok(()) }).with_pending_items(empty))
            .unwrap();
        lifecycle
            .add(SaveDescriptor::new("plain", (), |_| async { Ok(()) }))
            .unwrap();

        assert!(lifecycle.emergency_flush().await.unwrap().is_none());
        lifecycle.finish().await;

        assert!(!path.exists());
        assert_eq!(exit.codes(), vec![0]);
    }

    #[tokio::test]
    async fn test_finish_does_not_run_save_actions() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        lifecycle.add(recording(0, &log)).unwrap();

        lifecycle.finish().await;

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(exit.codes(), vec![0]);
        assert_eq!(lifecycle.state(), LifecycleState::Done);
    }

    #[tokio::test]
    async fn test_flush_failure_still_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let config = LifecycleConfig {
            flush_path: dir.path().join("missing").join("unsavedPlaces.json"),
            ..Default::default()
        };
        let (lifecycle, exit) = test_lifecycle(config);
        let unsaved = Arc::new(Mutex::new(vec!["place-1".to_string()]));
        lifecycle
            .add(SaveDescriptor::new("places", (), |_| async { Ok(()) }).with_pending_items(unsaved))
            .unwrap();

        let err = lifecycle.emergency_flush().await.unwrap_err();
        assert!(matches!(err, FlushError::Write { .. }));

        lifecycle.finish().await;
        assert_eq!(exit.codes(), vec![0]);
    }

    #[tokio::test]
    async fn test_finish_after_signal_is_ignored() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        lifecycle.add(failing(0, &log)).unwrap();

        lifecycle.handle_trigger(Trigger::Interrupt).await;
        lifecycle.finish().await;

        assert_eq!(exit.codes(), vec![1]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_finish_waits_for_signal_drain_in_progress() {
        let (lifecycle, exit) = test_lifecycle(LifecycleConfig::default());
        let lifecycle = Arc::new(lifecycle);
        let attempted = Arc::new(AtomicBool::new(false));
        let attempted_clone = Arc::clone(&attempted);
        lifecycle
            .add(SaveDescriptor::new("slow-failing", (), move |_| async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                attempted_clone.store(true, Ordering::SeqCst);
                Err(anyhow::anyhow!("upload rejected"))
            }))
            .unwrap();

        let signal = tokio::spawn({
            let lifecycle = Arc::clone(&lifecycle);
            async move { lifecycle.handle_trigger(Trigger::Interrupt).await }
        });
        while lifecycle.state() == LifecycleState::Idle {
            tokio::task::yield_now().await;
        }

        lifecycle.finish().await;

        assert!(attempted.load(Ordering::SeqCst), "finish returned mid-drain");
        assert_eq!(exit.codes(), vec![1]);
        assert_eq!(lifecycle.state(), LifecycleState::Done);
        signal.await.unwrap();
    }

    #[test]
    fn test_panic_message_payloads() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}

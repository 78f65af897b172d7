//! Save descriptors: units of work the coordinator runs before exit.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// Future returned by a save action.
pub type SaveFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// A save action with its data already bound. Consumed on invocation.
pub(crate) type SaveAction = Box<dyn FnOnce() -> SaveFuture + Send + 'static>;

/// A collection of not-yet-persisted items the coordinator may inspect on the
/// normal-exit path.
///
/// The coordinator only reads it: it checks whether anything is pending and,
/// if so, serializes the items for the emergency flush.
pub trait PendingItems: Send + Sync {
    /// Number of items currently pending.
    fn pending_count(&self) -> usize;

    /// Pretty-printed JSON array (2-space indent) of the pending items, in order.
    fn to_pretty_json(&self) -> serde_json::Result<String>;
}

impl<T> PendingItems for Mutex<Vec<T>>
where
    T: Serialize + Send,
{
    fn pending_count(&self) -> usize {
        self.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn to_pretty_json(&self) -> serde_json::Result<String> {
        let items = self.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_string_pretty(&*items)
    }
}

/// One unit of shutdown-time persistence work.
///
/// Pairs caller-owned `data` with the async `action` that persists it. The data
/// is moved into the descriptor and handed to the action unchanged when the
/// drain reaches this descriptor.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use scrape_utils::lifecycle::SaveDescriptor;
///
/// let unsaved: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
/// let descriptor = SaveDescriptor::new("places", Arc::clone(&unsaved), |places| async move {
///     let count = places.lock().map(|p| p.len()).unwrap_or(0);
///     log::info!("persisting {} places", count);
///     Ok(())
/// })
/// .with_pending_items(unsaved);
/// assert_eq!(descriptor.name(), "places");
/// ```
pub struct SaveDescriptor {
    name: String,
    action: SaveAction,
    pending_items: Option<Arc<dyn PendingItems>>,
}

impl SaveDescriptor {
    /// Creates a descriptor that will call `action(data)` during the drain.
    pub fn new<D, F, Fut>(name: impl Into<String>, data: D, action: F) -> Self
    where
        D: Send + 'static,
        F: FnOnce(D) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(move || -> SaveFuture { Box::pin(action(data)) }),
            pending_items: None,
        }
    }

    /// Attaches the collection the emergency flush should persist if it is
    /// still non-empty when the process exits normally.
    pub fn with_pending_items(mut self, items: Arc<dyn PendingItems>) -> Self {
        self.pending_items = Some(items);
        self
    }

    /// Label used in log lines and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pending_items(&self) -> Option<&Arc<dyn PendingItems>> {
        self.pending_items.as_ref()
    }

    pub(crate) fn into_action(self) -> (String, SaveAction) {
        (self.name, self.action)
    }
}

impl fmt::Debug for SaveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveDescriptor")
            .field("name", &self.name)
            .field(
                "pending_items",
                &self.pending_items.as_ref().map(|p| p.pending_count()),
            )
            .finish_non_exhaustive()
    }
}

//! Subscriber identity and the unsubscribe capability.
//!
//! Every listener registered on a signal gets a unique ID. The handle
//! returned by `subscribe` remembers that ID and removes exactly that
//! listener when invoked.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes one listener from the signal it was registered on.
///
/// Dropping the handle does *not* unsubscribe; call [`unsubscribe`]
/// explicitly. Calling it more than once is harmless, and calling it after
/// the signal is gone does nothing.
///
/// [`unsubscribe`]: Unsubscribe::unsubscribe
#[derive(Clone)]
pub struct Unsubscribe {
    id: SubscriberId,
    remove: Arc<dyn Fn(SubscriberId) + Send + Sync>,
}

impl Unsubscribe {
    pub(crate) fn new<F>(id: SubscriberId, remove: F) -> Self
    where
        F: Fn(SubscriberId) + Send + Sync + 'static,
    {
        Self {
            id,
            remove: Arc::new(remove),
        }
    }

    /// The ID of the listener this handle removes.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the listener.
    pub fn unsubscribe(&self) {
        (self.remove)(self.id);
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

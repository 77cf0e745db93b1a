//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! notifies its listeners when that value changes.
//!
//! # How Signals Work
//!
//! 1. A write that is the *same* as the current value (see
//!    [`SameValue`](super::SameValue)) is ignored entirely.
//!
//! 2. Any other write replaces the value immediately.
//!
//! 3. Outside a batch, every listener is called synchronously with the new
//!    value.
//!
//! 4. Inside a batch, the value is appended to the signal's pending queue
//!    and one flush job is queued on the microtask queue. The flush delivers
//!    only the final value, once.
//!
//! # Thread Safety
//!
//! Handles are `Send + Sync`; state lives behind `parking_lot` locks.
//! Batching and the microtask queue are per thread, so notification timing
//! is defined by the thread that performs the write.
//!
//! No lock is held while listeners run, so a listener may read or write any
//! signal, including the one notifying it.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;

use super::batching::is_batching;
use super::equality::{same_value, EqualsFn, SameValue};
use super::scheduler::queue_microtask;
use super::subscriber::{SubscriberId, Unsubscribe};
use crate::error::{invariant, Result};

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique signal ID.
fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A registered listener callback.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Read capability shared by every signal kind.
///
/// [`Signal`], [`Derived`](super::Derived) and anything else that can be
/// observed implement this, so a derived signal can be built on any of
/// them.
pub trait Source<T>: Send + Sync {
    /// Current value.
    fn value(&self) -> T;

    /// Register a listener called with each delivered value.
    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T) + Send + Sync + 'static;
}

struct SignalInner<T> {
    id: u64,

    value: RwLock<T>,

    listeners: RwLock<IndexMap<SubscriberId, Listener<T>>>,

    /// Bumped on every accepted write, under the `value` write lock.
    revision: AtomicU64,

    /// Values written during the current batch with their revisions, oldest
    /// first. `None` outside of a batch.
    pending: Mutex<Option<SmallVec<[(u64, T); 4]>>>,

    /// Whether a flush job is waiting on the microtask queue.
    flush_scheduled: AtomicBool,

    equals: EqualsFn<T>,
}

impl<T> SignalInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Call every listener registered right now with `value`.
    fn notify(&self, value: &T) {
        let listeners: SmallVec<[(SubscriberId, Listener<T>); 4]> = self
            .listeners
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        tracing::trace!(signal = self.id, listeners = listeners.len(), "notifying");

        for (id, listener) in listeners {
            // An earlier listener may have unsubscribed this one.
            if self.listeners.read().contains_key(&id) {
                listener(value);
            }
        }
    }

    /// Deliver the final value of a batch.
    fn flush(&self) -> Result<()> {
        self.flush_scheduled.store(false, Ordering::Release);

        let Some(queue) = self.pending.lock().take() else {
            tracing::debug!(signal = self.id, "flush skipped, queue was discarded");
            return Ok(());
        };

        let (revision, current) = {
            let value = self.value.read();
            (self.revision.load(Ordering::Acquire), value.clone())
        };
        let in_sync = queue.last().is_some_and(|(last, _)| *last == revision);
        invariant(in_sync, "queue is out of sync (this is a bug)")?;

        tracing::trace!(signal = self.id, coalesced = queue.len(), "flushing batch");
        self.notify(&current);
        Ok(())
    }
}

/// A reactive signal holding a value of type T.
///
/// # Type Parameters
///
/// - `T`: The type of value stored in the signal. Must be Clone + Send + Sync.
///
/// # Example
///
/// ```rust
/// use ripple_core::Signal;
///
/// let count = Signal::new(0);
/// let _handle = count.subscribe(|value| println!("count is now {value}"));
///
/// count.set(5);
/// assert_eq!(count.value(), 5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<SignalInner<T>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with identity-based change detection.
    pub fn new(value: T) -> Self
    where
        T: SameValue,
    {
        Self::with_equality(value, same_value::<T>)
    }

    /// Create a new signal that treats `equals(old, new)` writes as no-ops.
    pub fn with_equality(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: next_signal_id(),
                value: RwLock::new(value),
                listeners: RwLock::new(IndexMap::new()),
                revision: AtomicU64::new(0),
                pending: Mutex::new(None),
                flush_scheduled: AtomicBool::new(false),
                equals,
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get a clone of the current value.
    pub fn value(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Set a new value and notify listeners.
    ///
    /// The value is visible immediately. Notification is synchronous outside
    /// a batch and deferred to the microtask queue inside one.
    pub fn set(&self, new_value: T) {
        let revision = {
            let mut current = self.inner.value.write();
            if (self.inner.equals)(&current, &new_value) {
                tracing::trace!(signal = self.inner.id, "write ignored, value unchanged");
                return;
            }
            *current = new_value.clone();
            self.inner.revision.fetch_add(1, Ordering::AcqRel) + 1
        };

        if is_batching() {
            self.enqueue(revision, new_value);
        } else {
            if self.inner.pending.lock().take().is_some() {
                tracing::debug!(
                    signal = self.inner.id,
                    "synchronous write discarded pending batch"
                );
            }
            self.inner.notify(&new_value);
        }
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = self.with(f);
        self.set(new_value);
    }

    fn enqueue(&self, revision: u64, new_value: T) {
        self.inner
            .pending
            .lock()
            .get_or_insert_with(SmallVec::new)
            .push((revision, new_value));

        if !self.inner.flush_scheduled.swap(true, Ordering::AcqRel) {
            tracing::debug!(signal = self.inner.id, "flush scheduled");
            let inner = Arc::clone(&self.inner);
            queue_microtask(move || inner.flush());
        }
    }

    /// Register a listener.
    ///
    /// The returned handle removes exactly this listener.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        self.inner.listeners.write().insert(id, Arc::new(listener));

        let weak = Arc::downgrade(&self.inner);
        Unsubscribe::new(id, move |id| {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.write().shift_remove(&id);
            }
        })
    }

    /// Get the number of listeners.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Whether batched writes are waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    /// A handle that does not keep the signal alive.
    pub fn downgrade(&self) -> WeakSignal<T> {
        WeakSignal {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<T> Source<T> for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn value(&self) -> T {
        Signal::value(self)
    }

    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Signal::subscribe(self, listener)
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Non-owning signal handle, see [`Signal::downgrade`].
pub struct WeakSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Weak<SignalInner<T>>,
}

impl<T> WeakSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn upgrade(&self) -> Option<Signal<T>> {
        self.inner.upgrade().map(|inner| Signal { inner })
    }
}

impl<T> Clone for WeakSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

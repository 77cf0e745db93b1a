//! Derived Signal Implementation
//!
//! A Derived is a read-only signal whose value is a pure function of one
//! source signal's value.
//!
//! # How Derived Signals Work
//!
//! 1. On construction, the mapping runs once against the source's current
//!    value.
//!
//! 2. A single subscription to the source is installed. Every value the
//!    source delivers is mapped and written through an internal signal's
//!    own setter, so equality gating and batching apply to the derived
//!    value exactly as they do to a plain signal.
//!
//! 3. The subscription lives as long as the last `Derived` handle.
//!
//! Derived signals do not track dependencies automatically; the source is
//! fixed at construction.

use std::fmt::Debug;
use std::sync::Arc;

use super::equality::SameValue;
use super::signal::{Signal, Source};
use super::subscriber::Unsubscribe;
use crate::error::{Error, Result};

/// Keeps the subscription to the source alive.
struct Link(Unsubscribe);

impl Drop for Link {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

/// A read-only signal computed from another signal.
///
/// # Example
///
/// ```rust
/// use ripple_core::{derived, signal};
///
/// let count = signal(1);
/// let doubled = derived(&count, |v| v * 2);
///
/// count.set(10);
/// assert_eq!(doubled.value(), 20);
/// assert!(doubled.set(3).is_err());
/// ```
pub struct Derived<U>
where
    U: Clone + Send + Sync + 'static,
{
    signal: Signal<U>,
    _link: Arc<Link>,
}

impl<U> Derived<U>
where
    U: Clone + Send + Sync + SameValue + 'static,
{
    /// Map `base` through `f`.
    pub fn new<T, S, F>(base: &S, f: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        S: Source<T> + ?Sized,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let signal = Signal::new(f(&base.value()));

        let target = signal.downgrade();
        let link = base.subscribe(move |value: &T| {
            if let Some(signal) = target.upgrade() {
                signal.set(f(value));
            }
        });

        Self {
            signal,
            _link: Arc::new(Link(link)),
        }
    }
}

impl<U> Derived<U>
where
    U: Clone + Send + Sync + 'static,
{
    /// Get the current derived value.
    pub fn value(&self) -> U {
        self.signal.value()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&U) -> R) -> R {
        self.signal.with(f)
    }

    /// Derived values cannot be written.
    ///
    /// Always returns [`Error::ReadOnlySignal`]; no state changes.
    pub fn set(&self, _value: U) -> Result<()> {
        tracing::debug!(signal = self.signal.id(), "rejected write to derived signal");
        Err(Error::ReadOnlySignal)
    }

    /// Register a listener on the derived value.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&U) + Send + Sync + 'static,
    {
        self.signal.subscribe(listener)
    }

    /// Get the ID of the internal signal.
    pub fn id(&self) -> u64 {
        self.signal.id()
    }

    /// Get the number of listeners on the derived value.
    pub fn subscriber_count(&self) -> usize {
        self.signal.subscriber_count()
    }
}

impl<U> Source<U> for Derived<U>
where
    U: Clone + Send + Sync + 'static,
{
    fn value(&self) -> U {
        Derived::value(self)
    }

    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&U) + Send + Sync + 'static,
    {
        Derived::subscribe(self, listener)
    }
}

impl<U> Clone for Derived<U>
where
    U: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
            _link: Arc::clone(&self._link),
        }
    }
}

impl<U> Debug for Derived<U>
where
    U: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("id", &self.signal.id())
            .field("value", &self.value())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{batch, run_microtasks};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn derived_has_initial_value() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);

        assert_eq!(doubled.value(), 2);
    }

    #[test]
    fn derived_follows_base() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);

        base.set(10);
        assert_eq!(doubled.value(), 20);
    }

    #[test]
    fn derived_notifies_listeners() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _handle = doubled.subscribe(move |v| seen_clone.lock().push(*v));
        base.set(10);

        assert_eq!(*seen.lock(), vec![20]);
    }

    #[test]
    fn unchanged_mapping_does_not_notify() {
        let base = Signal::new(3);
        let parity = Derived::new(&base, |v| v % 2);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let _handle = parity.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        base.set(5);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let handle = doubled.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        handle.unsubscribe();
        base.set(10);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn derived_rejects_writes() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);

        assert_eq!(doubled.set(10), Err(Error::ReadOnlySignal));
        assert_eq!(doubled.value(), 2);
    }

    #[test]
    fn derived_of_derived() {
        let base = Signal::new(2);
        let squared = Derived::new(&base, |v| v * v);
        let label = Derived::new(&squared, |v: &i32| format!("{v}"));

        base.set(3);
        assert_eq!(label.value(), "9");
    }

    #[test]
    fn batched_base_updates_derived_on_flush() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _handle = doubled.subscribe(move |v| seen_clone.lock().push(*v));

        batch(|| {
            base.set(2);
            base.set(3);
        });

        // Recompute waits for the base's flush
        assert_eq!(doubled.value(), 2);
        run_microtasks().unwrap();
        assert_eq!(doubled.value(), 6);
        assert_eq!(*seen.lock(), vec![6]);
    }

    #[test]
    fn dropping_derived_releases_base_subscription() {
        let base = Signal::new(1);
        let doubled = Derived::new(&base, |v| v * 2);
        let copy = doubled.clone();
        assert_eq!(base.subscriber_count(), 1);

        drop(doubled);
        assert_eq!(base.subscriber_count(), 1);

        drop(copy);
        assert_eq!(base.subscriber_count(), 0);
    }
}

//! Ripple Core
//!
//! This crate provides small reactive-state primitives. It implements:
//!
//! - Signals: mutable cells that notify listeners when their value changes
//! - Derived signals: read-only mappings of another signal
//! - Batching: coalescing of many writes into one deferred notification
//! - Deep-mutation proxies: nested writes on structural values that produce
//!   new immutable snapshots
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `reactive`: signals, derived signals, batching and the microtask queue
//! - `proxy`: the structural `Value` model and deep-mutation wrappers
//!
//! Everything runs synchronously on the calling thread except batched
//! notifications, which wait on a per-thread microtask queue until the host
//! calls [`run_microtasks`].
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{batch, derived, run_microtasks, signal};
//!
//! // Create a signal
//! let count = signal(1);
//!
//! // Create a derived value
//! let doubled = derived(&count, |v| v * 2);
//!
//! // Listen for changes
//! let _handle = doubled.subscribe(|v| println!("doubled: {v}"));
//!
//! // Coalesce several writes into one notification
//! batch(|| {
//!     count.set(2);
//!     count.set(3);
//! });
//! assert_eq!(count.value(), 3);
//!
//! // Deliver the batched notification; prints "doubled: 6"
//! run_microtasks().unwrap();
//! assert_eq!(doubled.value(), 6);
//! ```

pub mod error;
pub mod proxy;
pub mod reactive;

pub use error::{Error, Result};
pub use proxy::{Key, Node, Proxy, Tracked, Value};
pub use reactive::{
    batch, is_batching, pending_microtasks, run_microtasks, BatchScope, Derived, SameValue,
    Signal, Source, Unsubscribe,
};

/// Create a signal with identity-based change detection.
pub fn signal<T>(initial: T) -> Signal<T>
where
    T: Clone + Send + Sync + SameValue + 'static,
{
    Signal::new(initial)
}

/// Create a read-only signal that maps `base` through `f`.
pub fn derived<T, U, S, F>(base: &S, f: F) -> Derived<U>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + SameValue + 'static,
    S: Source<T> + ?Sized,
    F: Fn(&T) -> U + Send + Sync + 'static,
{
    Derived::new(base, f)
}

/// Create a deep-mutation proxy over `initial`.
///
/// See [`proxy::get`] for unwrapping the values it hands out.
pub fn proxy(initial: impl Into<Value>) -> Proxy {
    Proxy::new(initial)
}

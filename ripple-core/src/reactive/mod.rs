//! Reactive Primitives
//!
//! This module implements signals, derived signals and batching. These
//! primitives form the foundation of Ripple's change notification.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. Writes that change the value
//! notify every listener registered with `subscribe`.
//!
//! ## Derived Signals
//!
//! A Derived is a read-only signal whose value is a pure mapping of one
//! source signal. It recomputes whenever the source delivers a value.
//!
//! ## Batches
//!
//! Inside `batch`, writes still update values immediately but listeners are
//! notified later, once per signal, with the last value written. The
//! deferred notifications run when the host drains the microtask queue with
//! `run_microtasks`.
//!
//! # Implementation Notes
//!
//! There is no automatic dependency tracking. A derived signal subscribes to
//! exactly one source when it is built and never re-evaluates that choice.

mod batching;
mod derived;
mod equality;
mod scheduler;
mod signal;
mod subscriber;

pub use batching::{batch, is_batching, BatchScope};
pub use derived::Derived;
pub use equality::{equals, same_value, EqualsFn, SameValue};
pub use scheduler::{pending_microtasks, queue_microtask, run_microtasks};
pub use signal::{Listener, Signal, Source, WeakSignal};
pub use subscriber::{SubscriberId, Unsubscribe};

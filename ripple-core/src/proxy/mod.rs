//! Deep-Mutation Proxy
//!
//! A proxy is a signal over a structural [`Value`] whose reads come back
//! wrapped, so nested fields can be written as if the value were mutable:
//!
//! ```rust
//! use ripple_core::proxy;
//! use serde_json::json;
//!
//! let state = proxy(json!({"a": 1, "b": {"c": 2}}));
//! state.value().get("b").set("c", 10).unwrap();
//!
//! assert_eq!(state.snapshot(), json!({"a": 1, "b": {"c": 10}}));
//! ```
//!
//! # How It Works
//!
//! 1. `Proxy::value` wraps the current root in a [`Tracked`] with an empty
//!    path. Reading a container child returns another wrapper whose path is
//!    one key longer; nothing is copied on read.
//!
//! 2. A write through a wrapper is compared against the stored child. The
//!    same value is ignored; anything else is reported with its full path.
//!
//! 3. The report rebuilds the root: each container on the path is
//!    shallow-copied with one slot replaced, every other subtree is shared.
//!    The new root is written through the signal's normal setter, so
//!    batching and listeners behave exactly as for a plain signal.
//!
//! 4. Array operations (`push`, `splice`, `sort`, ...) run on a copy of the
//!    array and report it once as the replacement for the whole array.
//!
//! Use [`get`] to recover the unwrapped value behind a read, for identity
//! comparisons with [`Value::same`].

mod rebuild;
mod tracked;
mod value;

pub use tracked::{Node, Tracked};
pub use value::{Key, Map, Path, Value, MAX_ARRAY_LEN};

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::reactive::{Signal, Source, Unsubscribe};

/// A signal over a [`Value`] with deep-mutation reads.
#[derive(Clone)]
pub struct Proxy {
    signal: Signal<Value>,
}

impl Proxy {
    /// Create a proxy holding `initial`.
    pub fn new(initial: impl Into<Value>) -> Self {
        Self {
            signal: Signal::new(initial.into()),
        }
    }

    /// Create a proxy from any serializable model.
    pub fn from_serialize<T: Serialize + ?Sized>(initial: &T) -> Result<Self> {
        Ok(Self::new(Value::from_serialize(initial)?))
    }

    /// Read the current value through a wrapper.
    ///
    /// Arrays and objects come back as [`Node::Tracked`], primitives as
    /// [`Node::Leaf`].
    pub fn value(&self) -> Node {
        Tracked::wrap(self.signal.value(), Path::new(), &self.signal)
    }

    /// The current value, unwrapped.
    pub fn snapshot(&self) -> Value {
        self.signal.value()
    }

    /// Replace the whole value, exactly like [`Signal::set`].
    pub fn set(&self, value: impl Into<Value>) {
        self.signal.set(value.into());
    }

    /// Register a listener called with each new root value.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.signal.subscribe(listener)
    }

    /// The signal that owns the value.
    pub fn signal(&self) -> &Signal<Value> {
        &self.signal
    }

    pub fn id(&self) -> u64 {
        self.signal.id()
    }
}

/// Observing a proxy yields unwrapped snapshots.
impl Source<Value> for Proxy {
    fn value(&self) -> Value {
        self.snapshot()
    }

    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Proxy::subscribe(self, listener)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.signal.id())
            .field("value", &self.snapshot())
            .finish()
    }
}

/// The unwrapped value behind a read.
///
/// Wrappers yield the exact container they wrap; plain values come back
/// unchanged.
pub fn get(node: impl Into<Node>) -> Value {
    node.into().into_value()
}

//! Deep-mutation wrappers.
//!
//! A [`Tracked`] wraps one array or object inside a proxy's current value
//! and remembers the path from the root to it. Reads hand out nested
//! wrappers without copying anything. Writes never touch the wrapped
//! container; they are reported to the owning signal, which rebuilds a new
//! root (see `rebuild`).

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::rebuild::apply;
use super::value::{display_path, Key, Path, Value, MAX_ARRAY_LEN};
use crate::error::{Error, Result};
use crate::reactive::Signal;

/// Either a plain value or a wrapper over a container.
///
/// Reads through a proxy return nodes: containers come back wrapped,
/// primitives come back as leaves.
#[derive(Clone, Debug)]
pub enum Node {
    Leaf(Value),
    Tracked(Tracked),
}

impl Node {
    /// The value this node stands for, unwrapped.
    pub fn original(&self) -> &Value {
        match self {
            Node::Leaf(value) => value,
            Node::Tracked(tracked) => tracked.original(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Node::Leaf(value) => value,
            Node::Tracked(tracked) => tracked.target,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_tracked(&self) -> Option<&Tracked> {
        match self {
            Node::Tracked(tracked) => Some(tracked),
            Node::Leaf(_) => None,
        }
    }

    /// The wrapper, or [`Error::NotAContainer`] for a leaf.
    pub fn tracked(self) -> Result<Tracked> {
        match self {
            Node::Tracked(tracked) => Ok(tracked),
            Node::Leaf(value) => Err(Error::NotAContainer(value.kind())),
        }
    }

    /// Read a child. Children of leaves are plain leaves.
    pub fn get(&self, key: impl Into<Key>) -> Node {
        let key = key.into();
        match self {
            Node::Tracked(tracked) => tracked.get(key),
            Node::Leaf(value) => Node::Leaf(value.child(&key).cloned().unwrap_or_default()),
        }
    }

    /// Write a child through the wrapper.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        match self {
            Node::Tracked(tracked) => tracked.set(key, value),
            Node::Leaf(leaf) => Err(Error::NotAContainer(leaf.kind())),
        }
    }
}

impl From<Tracked> for Node {
    fn from(tracked: Tracked) -> Self {
        Node::Tracked(tracked)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Leaf(value)
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Self {
        node.clone()
    }
}

impl PartialEq<serde_json::Value> for Node {
    fn eq(&self, other: &serde_json::Value) -> bool {
        self.original() == other
    }
}

/// Wrapper over an array or object reachable from a proxy's root.
#[derive(Clone)]
pub struct Tracked {
    /// The wrapped container, exactly as stored in the root value.
    target: Value,
    path: Path,
    owner: Signal<Value>,
}

impl Tracked {
    /// Wrap `value` if it is a container.
    pub(crate) fn wrap(value: Value, path: Path, owner: &Signal<Value>) -> Node {
        if value.is_container() {
            Node::Tracked(Self {
                target: value,
                path,
                owner: owner.clone(),
            })
        } else {
            Node::Leaf(value)
        }
    }

    /// The wrapped container, unwrapped. Identical to the container stored
    /// at this path when the wrapper was created.
    pub fn original(&self) -> &Value {
        &self.target
    }

    /// Keys from the proxy's root to this container.
    pub fn path(&self) -> &[Key] {
        &self.path
    }

    pub fn is_array(&self) -> bool {
        matches!(self.target, Value::Array(_))
    }

    /// Number of elements or fields.
    pub fn len(&self) -> usize {
        match &self.target {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of the wrapped container in order.
    pub fn keys(&self) -> Vec<Key> {
        match &self.target {
            Value::Array(items) => (0..items.len()).map(Key::Index).collect(),
            Value::Object(map) => map.keys().cloned().map(Key::Field).collect(),
            _ => Vec::new(),
        }
    }

    /// Read a child.
    ///
    /// Containers come back wrapped with the path extended by `key`; anything
    /// else comes back as a leaf. Missing children read as `Null`.
    pub fn get(&self, key: impl Into<Key>) -> Node {
        let key = key.into();
        let child = self.target.child(&key).cloned().unwrap_or_default();

        let mut path = self.path.clone();
        path.push(key);
        Self::wrap(child, path, &self.owner)
    }

    /// Write a child.
    ///
    /// Writing the same value that is already stored does nothing. Any other
    /// write replaces the owning signal's root with a rebuilt copy.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        self.check_key(&key)?;

        if let Some(old) = self.target.child(&key) {
            if old.same(&value) {
                tracing::trace!(path = %display_path(&self.path), %key, "write ignored, value unchanged");
                return Ok(());
            }
        }

        let mut path = self.path.clone();
        path.push(key);
        apply(&self.owner, &path, value)
    }

    fn check_key(&self, key: &Key) -> Result<()> {
        match (&self.target, key) {
            (Value::Array(_), Key::Index(_)) | (Value::Object(_), Key::Field(_)) => Ok(()),
            _ => Err(Error::KeyMismatch {
                key: key.clone(),
                kind: self.target.kind(),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Array operations
    //
    // Each one runs on a fresh copy of the elements and reports that copy
    // once, as the replacement of this whole array.
    // ------------------------------------------------------------------------

    fn mutate<R>(&self, op: impl FnOnce(&mut Vec<Value>) -> R) -> Result<(R, Value)> {
        let items = self
            .target
            .as_array()
            .ok_or(Error::NotAnArray(self.target.kind()))?;

        let mut copy = items.to_vec();
        let returned = op(&mut copy);
        let replacement = Value::Array(Arc::new(copy));

        apply(&self.owner, &self.path, replacement.clone())?;
        Ok((returned, replacement))
    }

    /// Append elements; returns the new length.
    pub fn push<I, V>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let (len, _) = self.mutate(|copy| {
            copy.extend(items.into_iter().map(Into::into));
            copy.len()
        })?;
        Ok(len)
    }

    /// Remove the last element.
    pub fn pop(&self) -> Result<Option<Value>> {
        Ok(self.mutate(Vec::pop)?.0)
    }

    /// Remove the first element.
    pub fn shift(&self) -> Result<Option<Value>> {
        let (removed, _) = self.mutate(|copy| (!copy.is_empty()).then(|| copy.remove(0)))?;
        Ok(removed)
    }

    /// Prepend elements; returns the new length.
    pub fn unshift<I, V>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let (len, _) = self.mutate(|copy| {
            copy.splice(0..0, items.into_iter().map(Into::into));
            copy.len()
        })?;
        Ok(len)
    }

    /// Remove `delete_count` elements at `start` and insert `items` there.
    ///
    /// `start` and `delete_count` are clamped to the array. Returns the
    /// removed elements.
    pub fn splice<I, V>(&self, start: usize, delete_count: usize, items: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let (removed, _) = self.mutate(|copy| {
            let start = start.min(copy.len());
            let end = start + delete_count.min(copy.len() - start);
            copy.splice(start..end, items.into_iter().map(Into::into))
                .collect::<Vec<_>>()
        })?;
        Ok(removed)
    }

    /// Sort with [`Value::compare`]; returns the sorted array.
    pub fn sort(&self) -> Result<Value> {
        self.sort_by(Value::compare)
    }

    /// Sort with a comparator; returns the sorted array.
    pub fn sort_by<F>(&self, compare: F) -> Result<Value>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        Ok(self.mutate(|copy| copy.sort_by(compare))?.1)
    }

    /// Reverse the elements; returns the reversed array.
    pub fn reverse(&self) -> Result<Value> {
        Ok(self.mutate(|copy| copy.reverse())?.1)
    }

    /// Truncate, or pad with `Null`, to `len` elements.
    ///
    /// Setting the current length does nothing. Lengths above
    /// [`MAX_ARRAY_LEN`] are rejected.
    pub fn set_len(&self, len: usize) -> Result<()> {
        let items = self
            .target
            .as_array()
            .ok_or(Error::NotAnArray(self.target.kind()))?;
        if items.len() == len {
            return Ok(());
        }
        if len > MAX_ARRAY_LEN {
            return Err(Error::IndexOutOfRange {
                index: len - 1,
                max: MAX_ARRAY_LEN,
            });
        }
        self.mutate(|copy| copy.resize(len, Value::Null))?;
        Ok(())
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("path", &display_path(&self.path))
            .field("target", &self.target)
            .field("owner", &self.owner.id())
            .finish()
    }
}

impl PartialEq<serde_json::Value> for Tracked {
    fn eq(&self, other: &serde_json::Value) -> bool {
        self.target == *other
    }
}

//! Copy-on-write reconstruction of a root value after a deep mutation.
//!
//! Given the previous root, the path of the mutated slot and the new leaf,
//! every container on the path is shallow-copied with one child replaced.
//! Everything off the path is shared with the previous root, so unrelated
//! subtrees keep their identity.

use super::value::{display_path, Key, Value};
use crate::error::{invariant, Error, Result};
use crate::reactive::Signal;

/// Build the root that results from writing `leaf` at `path` in `prev`.
///
/// An empty path replaces the whole root.
pub(crate) fn rebuild(prev: &Value, path: &[Key], leaf: Value) -> Result<Value> {
    let Some((key, rest)) = path.split_first() else {
        return Ok(leaf);
    };

    let child = if rest.is_empty() {
        leaf
    } else {
        let current = prev
            .child(key)
            .filter(|child| child.is_container())
            .ok_or_else(|| Error::StalePath(display_path(path)))?;
        rebuild(current, rest, leaf)?
    };

    prev.with_child(key, child)
}

/// Apply a reported mutation to the signal that owns the proxied value.
///
/// The rebuilt root goes through the signal's normal setter, so equality
/// gating and batching apply.
pub(crate) fn apply(owner: &Signal<Value>, path: &[Key], leaf: Value) -> Result<()> {
    let prev = owner.value();
    invariant(prev.is_container(), "prev must be an object")?;

    let next = rebuild(&prev, path, leaf)?;
    tracing::trace!(signal = owner.id(), path = %display_path(path), "deep mutation");
    owner.set(next);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(name: &str) -> Key {
        Key::from(name)
    }

    #[test]
    fn empty_path_replaces_root() {
        let prev = Value::from(json!({"a": 1}));
        let next = rebuild(&prev, &[], Value::from(json!([1]))).unwrap();

        assert_eq!(next, json!([1]));
    }

    #[test]
    fn nested_write_copies_only_the_path() {
        let prev = Value::from(json!({"a": {"d": 34}, "b": {"c": 2}}));
        let next = rebuild(&prev, &[key("a"), key("d")], Value::from(123)).unwrap();

        assert_eq!(next, json!({"a": {"d": 123}, "b": {"c": 2}}));
        assert!(!prev.same(&next));
        assert!(!prev.child(&key("a")).unwrap().same(next.child(&key("a")).unwrap()));
        assert!(prev.child(&key("b")).unwrap().same(next.child(&key("b")).unwrap()));
    }

    #[test]
    fn arrays_on_the_path_are_copied() {
        let prev = Value::from(json!([{"a": 1}, {"a": 2}]));
        let next = rebuild(&prev, &[Key::Index(0), key("a")], Value::from(5)).unwrap();

        assert_eq!(next, json!([{"a": 5}, {"a": 2}]));
        let untouched = Key::Index(1);
        assert!(prev.child(&untouched).unwrap().same(next.child(&untouched).unwrap()));
    }

    #[test]
    fn missing_intermediate_is_a_stale_path() {
        let prev = Value::from(json!({"a": 1}));
        let err = rebuild(&prev, &[key("a"), key("b")], Value::from(2)).unwrap_err();

        assert_eq!(err, Error::StalePath("a.b".to_string()));
    }

    #[test]
    fn apply_requires_container_root() {
        let owner = Signal::new(Value::from(1));
        let err = apply(&owner, &[key("a")], Value::from(2)).unwrap_err();

        assert_eq!(
            err,
            Error::InvariantViolation("prev must be an object".to_string())
        );
        assert_eq!(owner.value(), Value::from(1));
    }

    #[test]
    fn apply_writes_through_owner() {
        let owner = Signal::new(Value::from(json!({"a": 1})));
        apply(&owner, &[key("a")], Value::from(2)).unwrap();

        assert_eq!(owner.value(), json!({"a": 2}));
    }
}

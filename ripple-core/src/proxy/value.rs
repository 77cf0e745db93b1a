//! Structural values and the keys that address them.
//!
//! A `Value` is an immutable snapshot. Arrays and objects are shared behind
//! `Arc`, so cloning a value never copies a subtree and two values can be
//! checked for *identity* with [`Value::same`]. `PartialEq` is the deep,
//! structural comparison.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Map type backing [`Value::Object`]. Keeps insertion order.
pub type Map = IndexMap<String, Value>;

/// Longest array a write may produce by padding with `Null`.
///
/// Index writes past the end and [`Tracked::set_len`](super::Tracked::set_len)
/// fail with [`Error::IndexOutOfRange`] instead of growing an array beyond
/// this many elements.
pub const MAX_ARRAY_LEN: usize = 1 << 24;

/// A structural value: JSON-shaped data with shared containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<Map>),
}

impl Value {
    /// Build an array value.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Build an object value.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Convert any serializable type into a value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Convert this value into a typed model.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(serde_json::Value::from(self))?)
    }

    /// Identity comparison, the `===` of this model.
    ///
    /// Primitives compare by value; arrays and objects compare by pointer.
    /// An integer and a float are the same when they denote the same number.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) if a.is_f64() != b.is_f64() => {
                a.as_f64() == b.as_f64()
            }
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether this is an array or an object.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Article and noun for messages, e.g. "an array".
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }

    /// The child stored under `key`, if any.
    pub fn child(&self, key: &Key) -> Option<&Value> {
        match (self, key) {
            (Value::Array(items), Key::Index(i)) => items.get(*i),
            (Value::Object(map), Key::Field(name)) => map.get(name.as_str()),
            _ => None,
        }
    }

    /// Shallow copy of this container with `key` set to `child`.
    ///
    /// Siblings are shared with `self`, not copied. Writing an index past the
    /// end of an array pads the gap with `Null`, up to [`MAX_ARRAY_LEN`].
    pub fn with_child(&self, key: &Key, child: Value) -> Result<Value> {
        match (self, key) {
            (Value::Array(items), Key::Index(i)) => {
                let len = i
                    .checked_add(1)
                    .filter(|len| *len <= MAX_ARRAY_LEN)
                    .ok_or(Error::IndexOutOfRange {
                        index: *i,
                        max: MAX_ARRAY_LEN,
                    })?;
                let mut items = Vec::clone(items);
                if len > items.len() {
                    items.resize(len, Value::Null);
                }
                items[*i] = child;
                Ok(Value::Array(Arc::new(items)))
            }
            (Value::Object(map), Key::Field(name)) => {
                let mut map = Map::clone(map);
                map.insert(name.clone(), child);
                Ok(Value::Object(Arc::new(map)))
            }
            (Value::Array(_) | Value::Object(_), _) => Err(Error::KeyMismatch {
                key: key.clone(),
                kind: self.kind(),
            }),
            _ => Err(Error::NotAContainer(self.kind())),
        }
    }

    /// Total order used by [`Tracked::sort`](super::Tracked::sort).
    ///
    /// Values of different kinds order as null, booleans, numbers, strings,
    /// arrays, objects. Numbers compare numerically, strings and arrays
    /// lexicographically, objects by size.
    pub fn compare(&self, other: &Value) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            }
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => {
                    let a = a.as_f64().unwrap_or_default();
                    let b = b.as_f64().unwrap_or_default();
                    a.total_cmp(&b)
                }
            },
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.compare(y))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Value::Object(a), Value::Object(b)) => a.len().cmp(&b.len()),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self))
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(Arc::from(s)),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(map) => Value::object(map),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        serde_json::Value::from(self) == *other
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(Arc::new(map))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items.iter()),
            Value::Object(map) => serializer.collect_map(map.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

// ----------------------------------------------------------------------------
// Keys and paths
// ----------------------------------------------------------------------------

/// One step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Field(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Field(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Field(name)
    }
}

/// Keys from a proxy's root value down to a nested node.
pub type Path = SmallVec<[Key; 8]>;

/// Dotted rendering of a path, used in logs and errors.
pub(crate) fn display_path(path: &[Key]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_uses_identity_for_containers() {
        let a = Value::from(json!({"x": 1}));
        let b = Value::from(json!({"x": 1}));

        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn same_uses_value_for_primitives() {
        assert!(Value::from(1).same(&Value::from(1)));
        assert!(Value::from("a").same(&Value::from("a".to_string())));
        assert!(!Value::from(1).same(&Value::from("1")));
        assert!(Value::Null.same(&Value::Null));
    }

    #[test]
    fn integer_and_float_of_equal_value_are_the_same() {
        assert!(Value::from(1).same(&Value::from(1.0)));
        assert!(Value::from(1.0).same(&Value::from(1u64)));
        assert!(!Value::from(1).same(&Value::from(1.5)));
    }

    #[test]
    fn with_child_shares_siblings() {
        let root = Value::from(json!({"a": {"d": 34}, "b": {"c": 2}}));
        let next = root
            .with_child(&Key::from("a"), Value::from(json!({"d": 123})))
            .unwrap();

        let before_b = root.child(&Key::from("b")).unwrap();
        let after_b = next.child(&Key::from("b")).unwrap();
        assert!(before_b.same(after_b));
        assert!(!root.same(&next));
        assert_eq!(next, json!({"a": {"d": 123}, "b": {"c": 2}}));
    }

    #[test]
    fn with_child_pads_arrays() {
        let root = Value::from(json!([1]));
        let next = root.with_child(&Key::Index(3), Value::from(4)).unwrap();

        assert_eq!(next, json!([1, null, null, 4]));
    }

    #[test]
    fn with_child_rejects_indexes_past_the_limit() {
        let root = Value::from(json!([1]));

        for index in [MAX_ARRAY_LEN, usize::MAX] {
            assert_eq!(
                root.with_child(&Key::Index(index), Value::Null),
                Err(Error::IndexOutOfRange {
                    index,
                    max: MAX_ARRAY_LEN
                })
            );
        }
    }

    #[test]
    fn with_child_rejects_mismatched_keys() {
        let root = Value::from(json!([1]));
        assert_eq!(
            root.with_child(&Key::from("a"), Value::Null),
            Err(Error::KeyMismatch {
                key: Key::from("a"),
                kind: "an array"
            })
        );

        assert_eq!(
            Value::from(1).with_child(&Key::Index(0), Value::Null),
            Err(Error::NotAContainer("a number"))
        );
    }

    #[test]
    fn compare_orders_mixed_values() {
        let mut items = [
            Value::from("b"),
            Value::from(10),
            Value::Null,
            Value::from(2),
            Value::from("a"),
            Value::from(true),
        ];
        items.sort_by(Value::compare);

        assert_eq!(Value::array(items), json!([null, true, 2, 10, "a", "b"]));
    }

    #[test]
    fn serde_bridge() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Todo {
            title: String,
            done: bool,
        }

        let todo = Todo {
            title: "write tests".into(),
            done: false,
        };
        let value = Value::from_serialize(&todo).unwrap();
        assert_eq!(value, json!({"title": "write tests", "done": false}));
        assert_eq!(value.deserialize::<Todo>().unwrap(), todo);

        let err = Value::from(1).deserialize::<Todo>().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn display_renders_json() {
        let value = Value::from(json!({"a": [1, "x"]}));
        assert_eq!(value.to_string(), r#"{"a":[1,"x"]}"#);
        assert_eq!(display_path(&[Key::from("a"), Key::Index(0)]), "a.0");
        assert_eq!(display_path(&[]), "<root>");
    }
}

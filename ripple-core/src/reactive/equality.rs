//! Change detection for signal writes.
//!
//! A write is ignored when the new value is the *same* as the current one.
//! "Same" means identity, not deep equality: plain data compares by value,
//! shared containers compare by pointer. Two separately built but
//! structurally equal `Arc`s are different values and do notify.

use std::sync::Arc;

use crate::proxy::Value;

/// Equality function type stored by a signal.
pub type EqualsFn<T> = fn(&T, &T) -> bool;

/// Identity comparison used as a signal's default equality.
pub trait SameValue {
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! same_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameValue for $ty {
                #[inline]
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_by_eq!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64, String, &'static str,
);

impl<T: ?Sized> SameValue for Arc<T> {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_value(b),
            _ => false,
        }
    }
}

impl SameValue for Value {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        self.same(other)
    }
}

/// Default equality: [`SameValue`].
pub fn same_value<T: SameValue>(a: &T, b: &T) -> bool {
    a.same_value(b)
}

/// Structural equality via `PartialEq`, for use with
/// [`Signal::with_equality`](super::Signal::with_equality).
pub fn equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

//! Batch Controller
//!
//! While a batch scope is open, signal writes still update the visible
//! value immediately but their notifications are queued on the signal and
//! delivered once from the microtask queue.
//!
//! # Implementation
//!
//! Each thread keeps a depth counter. Entering a scope increments it and the
//! returned guard decrements it on drop, so the flag is restored even if the
//! batched closure panics. Nested scopes flatten: only the outermost exit
//! clears the flag.

use std::cell::Cell;

thread_local! {
    static BATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Guard for an open batch scope.
///
/// The scope closes when the guard is dropped.
#[must_use = "the batch scope closes as soon as the guard is dropped"]
pub struct BatchScope {
    depth: usize,
}

impl BatchScope {
    /// Open a batch scope on the current thread.
    pub fn enter() -> Self {
        let depth = BATCH_DEPTH.with(|d| {
            let depth = d.get() + 1;
            d.set(depth);
            depth
        });

        if depth == 1 {
            tracing::debug!("batch opened");
        }

        Self { depth }
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        BATCH_DEPTH.with(|d| {
            let current = d.get();

            // Guards are dropped in reverse order of creation.
            debug_assert_eq!(
                current, self.depth,
                "BatchScope mismatch: expected depth {}, got {}",
                self.depth, current
            );

            d.set(current.saturating_sub(1));
            if current == 1 {
                tracing::debug!("batch closed");
            }
        });
    }
}

/// Run `f` with batching enabled.
///
/// Writes made inside `f` are coalesced per signal; each written signal
/// notifies its listeners once, with its final value, when the host next
/// calls [`run_microtasks`](super::run_microtasks).
///
/// ```rust
/// use ripple_core::{batch, run_microtasks, signal};
///
/// let count = signal(1);
/// batch(|| {
///     count.set(2);
///     count.set(3);
/// });
/// assert_eq!(count.value(), 3);
/// run_microtasks().unwrap();
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let _scope = BatchScope::enter();
    f()
}

/// Whether the current thread is inside a batch scope.
pub fn is_batching() -> bool {
    BATCH_DEPTH.with(|d| d.get() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn batch_sets_and_clears_flag() {
        assert!(!is_batching());

        batch(|| {
            assert!(is_batching());
        });

        assert!(!is_batching());
    }

    #[test]
    fn nested_batches_flatten() {
        batch(|| {
            batch(|| {
                assert!(is_batching());
            });

            // Inner exit must not end the outer scope
            assert!(is_batching());
        });

        assert!(!is_batching());
    }

    #[test]
    fn flag_is_released_on_panic() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            batch(|| panic!("boom"));
        }));

        assert!(result.is_err());
        assert!(!is_batching());
    }

    #[test]
    fn batch_returns_closure_result() {
        assert_eq!(batch(|| 7), 7);
    }

    #[test]
    fn scope_guard_controls_flag() {
        {
            let _scope = BatchScope::enter();
            assert!(is_batching());
        }
        assert!(!is_batching());
    }
}

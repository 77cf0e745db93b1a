//! Error types shared by every module of the crate.
//!
//! Two families of failures exist:
//!
//! - Invariant violations. Internal bookkeeping disagreed with itself, which
//!   means there is a bug in this crate. They are logged and returned to the
//!   caller untouched; nothing retries them.
//! - Misuse. The caller asked for something the API cannot do, such as
//!   writing to a derived signal or addressing an object with an index.

use crate::proxy::Key;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Internal state is inconsistent.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A write was attempted on a derived signal.
    #[error("can't set the value of a derived signal")]
    ReadOnlySignal,

    /// The key kind does not fit the container it addresses.
    #[error("key `{key}` cannot address {kind}")]
    KeyMismatch { key: Key, kind: &'static str },

    /// A container operation was invoked on a primitive node.
    #[error("expected an object or array, found {0}")]
    NotAContainer(&'static str),

    /// An array operation was invoked on something other than an array.
    #[error("expected an array, found {0}")]
    NotAnArray(&'static str),

    /// A write would grow an array past [`MAX_ARRAY_LEN`](crate::proxy::MAX_ARRAY_LEN).
    #[error("array index {index} is out of range, arrays hold at most {max} elements")]
    IndexOutOfRange { index: usize, max: usize },

    /// A wrapper's path no longer leads to a container in the current value.
    #[error("path `{0}` no longer addresses an object or array")]
    StalePath(String),

    /// Conversion between `Value` and a typed model failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Check an internal invariant, logging and returning an error on failure.
pub(crate) fn invariant(condition: bool, message: &str) -> Result<()> {
    if condition {
        return Ok(());
    }
    tracing::error!(invariant = message, "invariant violated");
    Err(Error::InvariantViolation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_passes_when_condition_holds() {
        assert_eq!(invariant(true, "never shown"), Ok(()));
    }

    #[test]
    fn invariant_reports_message() {
        let err = invariant(false, "prev must be an object").unwrap_err();
        assert_eq!(
            err,
            Error::InvariantViolation("prev must be an object".to_string())
        );
        assert_eq!(
            err.to_string(),
            "Invariant violation: prev must be an object"
        );
    }

    #[test]
    fn key_mismatch_names_key() {
        let err = Error::KeyMismatch {
            key: Key::from("name"),
            kind: "an array",
        };
        assert_eq!(err.to_string(), "key `name` cannot address an array");
    }
}

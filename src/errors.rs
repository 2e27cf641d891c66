use std::fmt::Display;

use thiserror::Error;

/// Failure to canonicalize an argument value into a [`CacheKey`].
///
/// Raised before the wrapped function is invoked; no cache mutation has
/// happened when a caller sees this.
///
/// [`CacheKey`]: crate::key::CacheKey
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The value cannot participate in a cache key. Non-finite floats are
    /// the main offender: keying them would silently alias distinct values.
    #[error("unsupported value in cache key: {0}")]
    Unsupported(String),
    /// A custom `Serialize` implementation reported an error of its own.
    #[error("argument serialization failed: {0}")]
    Serialization(String),
}

impl serde::ser::Error for KeyError {
    fn custom<T: Display>(msg: T) -> Self {
        KeyError::Serialization(msg.to_string())
    }
}

/// Error surface of the fallible memoizer.
#[derive(Debug, Error)]
pub enum CallError<E>
where
    E: std::error::Error,
{
    /// Key derivation failed; the wrapped function never ran.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// The wrapped function failed on a cache miss. The key stays absent,
    /// so a later call with equal arguments invokes the function again.
    #[error(transparent)]
    Func(E),
}

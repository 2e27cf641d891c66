//! Argument-keyed memoization for plain Rust functions.
//!
//! [`memoize`] wraps a function so each distinct argument value is computed
//! once and replayed from an in-process cache afterwards; [`try_memoize`]
//! does the same for fallible functions without ever caching an error, and
//! [`once`] wraps a function so it runs at most one time regardless of
//! arguments. Keys are derived by canonical, type-aware serialization of the
//! argument value (see [`key::serializer::KeySerializer`] for the scheme).
//!
//! Each wrapper owns its cache outright: no globals, no sharing between
//! instances, no eviction. Calls are safe from multiple threads; the
//! check-then-insert sequence is locked, so a wrapped function still runs at
//! most once per key under concurrent callers.

pub mod errors;
pub mod key;
pub mod memo;

pub use errors::{CallError, KeyError};
pub use key::CacheKey;
pub use memo::{
    memoize, memoize_with, once, once_with, try_memoize, try_memoize_with, CacheStats, Memo, Once,
    TryMemo,
};

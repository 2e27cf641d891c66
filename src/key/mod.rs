pub mod serializer;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::KeyError;
use crate::key::serializer::KeySerializer;

/// Canonical cache key derived from an argument value.
///
/// Two argument values produce equal keys exactly when they are structurally
/// equal under the canonical scheme in [`KeySerializer`]; the scheme is
/// order- and type-sensitive, so `(1, "1")`, `("1", 1)` and `(1, 1)` all key
/// differently. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Derives the key for an argument value.
    ///
    /// Fails with [`KeyError`] when the value cannot be canonicalized, e.g.
    /// a non-finite float or a `Serialize` impl that errors. Nothing is
    /// cached on failure.
    pub fn from_args<A>(args: &A) -> Result<Self, KeyError>
    where
        A: Serialize + ?Sized,
    {
        let mut out = String::new();
        args.serialize(KeySerializer::new(&mut out))?;
        Ok(Self(Arc::from(out)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

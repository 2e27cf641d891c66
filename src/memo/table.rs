use ahash::AHashMap;

use crate::key::CacheKey;

/// Point-in-time view of a wrapper's cache activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Calls served from the cache without invoking the wrapped function.
    pub hits: u64,
    /// Calls that invoked the wrapped function.
    pub misses: u64,
    /// Distinct keys currently cached.
    pub entries: usize,
}

/// Per-instance result store. Owned by exactly one wrapper, created empty at
/// wrap time, grows monotonically, dropped with its owner.
#[derive(Debug)]
pub(crate) struct CacheTable<R> {
    pub(crate) entries: AHashMap<CacheKey, R>,
    pub(crate) hits: u64,
    pub(crate) misses: u64,
}

impl<R> CacheTable<R> {
    pub(crate) fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

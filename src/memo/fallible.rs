use std::marker::PhantomData;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::errors::CallError;
use crate::key::CacheKey;
use crate::memo::table::{CacheStats, CacheTable};

/// Memoizing wrapper around a fallible function.
///
/// Successful results are cached under the same contract as [`Memo`]; an
/// `Err` from the wrapped function is propagated verbatim and never cached,
/// so a later call with equal arguments invokes the function again.
///
/// [`Memo`]: crate::memo::Memo
pub struct TryMemo<C, A, R, E, F> {
    func: F,
    context: C,
    cache: Mutex<CacheTable<R>>,
    _args: PhantomData<fn(&A) -> E>,
}

impl<C, A, R, E, F> TryMemo<C, A, R, E, F>
where
    A: Serialize,
    R: Clone,
    E: std::error::Error,
    F: Fn(&C, &A) -> Result<R, E>,
{
    fn new(context: C, func: F) -> Self {
        Self {
            func,
            context,
            cache: Mutex::new(CacheTable::new()),
            _args: PhantomData,
        }
    }

    /// Calls through the cache. Lock discipline matches [`Memo::call`]:
    /// held across lookup, invocation and insert.
    ///
    /// [`Memo::call`]: crate::memo::Memo::call
    pub fn call(&self, args: &A) -> Result<R, CallError<E>> {
        let key = CacheKey::from_args(args)?;
        let mut guard = self.cache.lock();
        let table = &mut *guard;
        if let Some(value) = table.entries.get(&key).cloned() {
            table.hits += 1;
            debug!(key = %key, "memo cache hit");
            return Ok(value);
        }
        table.misses += 1;
        debug!(key = %key, "memo cache miss");
        let value = (self.func)(&self.context, args).map_err(CallError::Func)?;
        table.entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a successful result is already cached for these arguments.
    pub fn contains(&self, args: &A) -> Result<bool, CallError<E>> {
        let key = CacheKey::from_args(args)?;
        Ok(self.cache.lock().entries.contains_key(&key))
    }

    /// The receiver passed at wrap time.
    pub fn context(&self) -> &C {
        &self.context
    }
}

/// Wraps a fallible `func`; only successful results are memoized.
pub fn try_memoize<A, R, E, F>(func: F) -> TryMemo<(), A, R, E, impl Fn(&(), &A) -> Result<R, E>>
where
    A: Serialize,
    R: Clone,
    E: std::error::Error,
    F: Fn(&A) -> Result<R, E>,
{
    TryMemo::new((), move |_ctx: &(), args: &A| func(args))
}

/// Like [`try_memoize`], with an explicit receiver handed to every invocation
/// of the wrapped function.
pub fn try_memoize_with<C, A, R, E, F>(context: C, func: F) -> TryMemo<C, A, R, E, F>
where
    A: Serialize,
    R: Clone,
    E: std::error::Error,
    F: Fn(&C, &A) -> Result<R, E>,
{
    TryMemo::new(context, func)
}

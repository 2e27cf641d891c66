use std::marker::PhantomData;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::errors::KeyError;
use crate::key::CacheKey;
use crate::memo::table::{CacheStats, CacheTable};

/// Memoizing wrapper around an infallible function.
///
/// Each argument value is canonicalized into a [`CacheKey`]; the wrapped
/// function runs at most once per distinct key for the lifetime of the
/// wrapper. The cache belongs to this instance alone and never shrinks.
///
/// Memoization is only sound for functions that are deterministic in their
/// arguments; the wrapper cannot verify that. Side effects of the wrapped
/// function happen at most once per key; callers must not rely on them
/// recurring.
pub struct Memo<C, A, R, F> {
    func: F,
    context: C,
    cache: Mutex<CacheTable<R>>,
    _args: PhantomData<fn(&A)>,
}

impl<C, A, R, F> Memo<C, A, R, F>
where
    A: Serialize,
    R: Clone,
    F: Fn(&C, &A) -> R,
{
    fn new(context: C, func: F) -> Self {
        Self {
            func,
            context,
            cache: Mutex::new(CacheTable::new()),
            _args: PhantomData,
        }
    }

    /// Calls through the cache.
    ///
    /// The lock is held across lookup, invocation and insert, so concurrent
    /// callers see strict at-most-once evaluation per key. The flip side is
    /// that a long-running wrapped function also blocks callers on other
    /// keys.
    pub fn call(&self, args: &A) -> Result<R, KeyError> {
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
        let value = (self.func)(&self.context, args);
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

    /// Whether a result is already cached for these arguments.
    pub fn contains(&self, args: &A) -> Result<bool, KeyError> {
        let key = CacheKey::from_args(args)?;
        Ok(self.cache.lock().entries.contains_key(&key))
    }

    /// The receiver passed at wrap time.
    pub fn context(&self) -> &C {
        &self.context
    }
}

/// Wraps `func` so repeated calls with structurally equal arguments reuse the
/// first computed result.
///
/// ```
/// use memofn::memoize;
///
/// let multiply = memoize(|&(a, b): &(i64, i64)| a * b);
/// assert_eq!(multiply.call(&(9467, 7649))?, 9467 * 7649);
/// assert_eq!(multiply.call(&(9467, 7649))?, 9467 * 7649);
/// assert_eq!(multiply.stats().misses, 1);
/// # Ok::<(), memofn::KeyError>(())
/// ```
pub fn memoize<A, R, F>(func: F) -> Memo<(), A, R, impl Fn(&(), &A) -> R>
where
    A: Serialize,
    R: Clone,
    F: Fn(&A) -> R,
{
    Memo::new((), move |_ctx: &(), args: &A| func(args))
}

/// Like [`memoize`], with an explicit receiver handed to every invocation of
/// the wrapped function.
pub fn memoize_with<C, A, R, F>(context: C, func: F) -> Memo<C, A, R, F>
where
    A: Serialize,
    R: Clone,
    F: Fn(&C, &A) -> R,
{
    Memo::new(context, func)
}

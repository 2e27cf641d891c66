use std::marker::PhantomData;

use parking_lot::Mutex;
use tracing::debug;

enum OnceState<R, F> {
    Pending(F),
    Done(R),
}

/// Wrapper that runs its function at most one time.
///
/// The first call invokes the wrapped function and caches its result; every
/// later call returns that result and ignores its own arguments. The wrapped
/// closure is dropped once it has run. If the closure panics, the wrapper
/// stays in its pending state and the next call retries.
///
/// No cache key is derived, so the argument type needs no `Serialize` bound.
pub struct Once<C, A, R, F> {
    state: Mutex<OnceState<R, F>>,
    context: C,
    _args: PhantomData<fn(&A)>,
}

impl<C, A, R, F> Once<C, A, R, F>
where
    R: Clone,
    F: Fn(&C, &A) -> R,
{
    fn new(context: C, func: F) -> Self {
        Self {
            state: Mutex::new(OnceState::Pending(func)),
            context,
            _args: PhantomData,
        }
    }

    pub fn call(&self, args: &A) -> R {
        let mut state = self.state.lock();
        match &*state {
            OnceState::Done(value) => value.clone(),
            OnceState::Pending(func) => {
                let value = func(&self.context, args);
                *state = OnceState::Done(value.clone());
                debug!("once wrapper ran");
                value
            }
        }
    }

    /// Whether the wrapped function has already run.
    pub fn has_run(&self) -> bool {
        matches!(&*self.state.lock(), OnceState::Done(_))
    }

    /// The receiver passed at wrap time.
    pub fn context(&self) -> &C {
        &self.context
    }
}

/// Wraps `func` so it runs at most one time; later calls replay the first
/// result.
pub fn once<A, R, F>(func: F) -> Once<(), A, R, impl Fn(&(), &A) -> R>
where
    R: Clone,
    F: Fn(&A) -> R,
{
    Once::new((), move |_ctx: &(), args: &A| func(args))
}

/// Like [`once`], with an explicit receiver handed to the single invocation.
pub fn once_with<C, A, R, F>(context: C, func: F) -> Once<C, A, R, F>
where
    R: Clone,
    F: Fn(&C, &A) -> R,
{
    Once::new(context, func)
}

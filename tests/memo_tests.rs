use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use memofn::{memoize, memoize_with, try_memoize, CallError};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn repeated_calls_invoke_the_function_once() -> Result<()> {
    init_logging();

    let invocations = AtomicUsize::new(0);
    let multiply = memoize(|&(a, b): &(i64, i64)| {
        invocations.fetch_add(1, Ordering::SeqCst);
        a * b
    });

    let first = multiply.call(&(9467, 7649))?;
    let second = multiply.call(&(9467, 7649))?;

    assert_eq!(first, 9467 * 7649);
    assert_eq!(second, first);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert!(multiply.contains(&(9467, 7649))?);

    let stats = multiply.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
    Ok(())
}

#[test]
fn distinct_arguments_evaluate_independently() -> Result<()> {
    let invocations = AtomicUsize::new(0);
    let square = memoize(|&n: &i64| {
        invocations.fetch_add(1, Ordering::SeqCst);
        n * n
    });

    assert_eq!(square.call(&4)?, 16);
    assert_eq!(square.call(&5)?, 25);
    assert_eq!(square.call(&4)?, 16);
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(square.len(), 2);
    Ok(())
}

#[test]
fn argument_order_is_part_of_the_key() -> Result<()> {
    let subtract = memoize(|&(a, b): &(i64, i64)| a - b);

    assert_eq!(subtract.call(&(1, 2))?, -1);
    assert_eq!(subtract.call(&(2, 1))?, 1);
    assert_eq!(subtract.stats().misses, 2);
    Ok(())
}

#[derive(serde::Serialize)]
enum Arg {
    Int(i64),
    Text(String),
}

#[test]
fn keys_distinguish_value_kinds() -> Result<()> {
    let invocations = AtomicUsize::new(0);
    let describe = memoize(|args: &Vec<Arg>| {
        invocations.fetch_add(1, Ordering::SeqCst);
        args.len()
    });

    describe.call(&vec![Arg::Int(1), Arg::Text("1".into())])?;
    describe.call(&vec![Arg::Text("1".into()), Arg::Int(1)])?;
    describe.call(&vec![Arg::Int(1), Arg::Int(1)])?;

    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    assert_eq!(describe.len(), 3);
    Ok(())
}

#[test]
fn side_effects_happen_once_per_key() -> Result<()> {
    let counter = AtomicUsize::new(0);
    let record = memoize(|&n: &usize| counter.fetch_add(1, Ordering::SeqCst) + n);

    let first = record.call(&5)?;
    assert_eq!(record.call(&5)?, first);
    assert_eq!(record.call(&5)?, first);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("refusing to halve {0}")]
struct Unhalvable(i64);

#[test]
fn failures_are_not_cached() -> Result<()> {
    let invocations = AtomicUsize::new(0);
    let halve = try_memoize(|&n: &i64| {
        let attempt = invocations.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            Err(Unhalvable(n))
        } else {
            Ok(n / 2)
        }
    });

    assert!(matches!(
        halve.call(&8),
        Err(CallError::Func(Unhalvable(8)))
    ));
    assert!(!halve.contains(&8)?);

    // Same arguments retry the function; the success is then cached.
    assert_eq!(halve.call(&8)?, 4);
    assert_eq!(halve.call(&8)?, 4);
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn unsupported_arguments_fail_before_invoking() -> Result<()> {
    let invocations = AtomicUsize::new(0);
    let identity = memoize(|&x: &f64| {
        invocations.fetch_add(1, Ordering::SeqCst);
        x
    });

    assert!(identity.call(&f64::NAN).is_err());
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
    assert!(identity.is_empty());

    assert_eq!(identity.call(&1.5)?, 1.5);
    Ok(())
}

#[test]
fn wrap_time_context_reaches_the_function() -> Result<()> {
    let scale = memoize_with(10i64, |factor: &i64, &n: &i64| factor * n);

    assert_eq!(scale.call(&4)?, 40);
    assert_eq!(*scale.context(), 10);
    Ok(())
}

#[test]
fn concurrent_callers_share_one_evaluation() -> Result<()> {
    init_logging();

    let invocations = AtomicUsize::new(0);
    let slow_square = memoize(|&n: &i64| {
        invocations.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(10));
        n * n
    });

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let value = slow_square.call(&12).expect("call should succeed");
                assert_eq!(value, 144);
            });
        }
    });

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(slow_square.stats().hits, 7);
    Ok(())
}

#[test]
fn instances_do_not_share_caches() -> Result<()> {
    let first_calls = AtomicUsize::new(0);
    let second_calls = AtomicUsize::new(0);

    let first = memoize(|&n: &i64| {
        first_calls.fetch_add(1, Ordering::SeqCst);
        n + 1
    });
    let second = memoize(|&n: &i64| {
        second_calls.fetch_add(1, Ordering::SeqCst);
        n + 1
    });

    first.call(&7)?;
    second.call(&7)?;

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

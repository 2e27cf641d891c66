use std::collections::HashMap;

use anyhow::Result;
use memofn::{CacheKey, KeyError};
use serde::Serialize;

#[derive(Serialize)]
struct Request {
    verb: String,
    attempts: u32,
}

#[test]
fn equal_values_share_a_key() -> Result<()> {
    let a = CacheKey::from_args(&Request {
        verb: "get".into(),
        attempts: 2,
    })?;
    let b = CacheKey::from_args(&Request {
        verb: "get".into(),
        attempts: 2,
    })?;

    assert_eq!(a, b);
    Ok(())
}

#[test]
fn any_field_change_changes_the_key() -> Result<()> {
    let base = CacheKey::from_args(&Request {
        verb: "get".into(),
        attempts: 2,
    })?;
    let retried = CacheKey::from_args(&Request {
        verb: "get".into(),
        attempts: 3,
    })?;
    let renamed = CacheKey::from_args(&Request {
        verb: "put".into(),
        attempts: 2,
    })?;

    assert_ne!(base, retried);
    assert_ne!(base, renamed);
    Ok(())
}

#[test]
fn map_iteration_order_does_not_matter() -> Result<()> {
    let mut forward = HashMap::new();
    forward.insert("a", 1);
    forward.insert("b", 2);
    forward.insert("c", 3);

    let mut reverse = HashMap::new();
    reverse.insert("c", 3);
    reverse.insert("b", 2);
    reverse.insert("a", 1);

    assert_eq!(CacheKey::from_args(&forward)?, CacheKey::from_args(&reverse)?);
    Ok(())
}

#[test]
fn numeric_and_text_forms_do_not_alias() -> Result<()> {
    assert_ne!(CacheKey::from_args(&1i64)?, CacheKey::from_args(&"1")?);
    assert_ne!(CacheKey::from_args(&1i64)?, CacheKey::from_args(&1u64)?);
    assert_ne!(CacheKey::from_args(&1i64)?, CacheKey::from_args(&1.0f64)?);
    Ok(())
}

#[test]
fn non_finite_floats_fail_loudly() {
    let err = CacheKey::from_args(&f64::INFINITY).unwrap_err();
    assert!(matches!(err, KeyError::Unsupported(_)));
}

#[test]
fn keys_display_their_canonical_text() -> Result<()> {
    let key = CacheKey::from_args(&(1u8, 'x'))?;
    assert_eq!(key.to_string(), key.as_str());
    Ok(())
}

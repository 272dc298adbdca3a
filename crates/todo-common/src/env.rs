//! Environment lookups shared by the binaries

use anyhow::{Context, Result};
use std::str::FromStr;
use tracing::debug;

/// Read `key`, falling back to `default` when it is unset or empty.
pub fn var_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => {
            debug!("{} not set, using default", key);
            default.to_string()
        }
    }
}

/// Read a variable that has no sensible default.
pub fn required(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .with_context(|| format!("{} must be set", key))
}

/// Parse `key` into `T`; unset uses `default`, an unparsable value is an error.
pub fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", key, val, e)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_and_rejects_garbage() {
        std::env::remove_var("TODO_COMMON_TEST_UNSET");
        assert_eq!(parse_or("TODO_COMMON_TEST_UNSET", 7u16).unwrap(), 7);

        std::env::set_var("TODO_COMMON_TEST_PORT", "not-a-port");
        assert!(parse_or("TODO_COMMON_TEST_PORT", 3000u16).is_err());

        std::env::set_var("TODO_COMMON_TEST_PORT_OK", " 8080 ");
        assert_eq!(parse_or("TODO_COMMON_TEST_PORT_OK", 3000u16).unwrap(), 8080);
    }

    #[test]
    fn test_required_rejects_blank() {
        std::env::set_var("TODO_COMMON_TEST_BLANK", "   ");
        assert!(required("TODO_COMMON_TEST_BLANK").is_err());
        assert_eq!(var_or("TODO_COMMON_TEST_BLANK", "fallback"), "fallback");
    }
}

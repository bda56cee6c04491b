//! Environment lookups shared by service configuration.

use std::str::FromStr;

/// Parse `key` from the environment, falling back to `default` when the
/// variable is missing or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// String variable with a default.
pub fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Boolean switch. Accepts `1`/`true`/`yes`/`on` (case-insensitive) as true and
/// `0`/`false`/`no`/`off` as false; anything else yields `default`.
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn env_or_falls_back_on_missing_and_garbage() {
        std::env::remove_var("DB_POOL_TEST_NUM");
        assert_eq!(env_or("DB_POOL_TEST_NUM", 42u32), 42);

        std::env::set_var("DB_POOL_TEST_NUM", "not-a-number");
        assert_eq!(env_or("DB_POOL_TEST_NUM", 42u32), 42);

        std::env::set_var("DB_POOL_TEST_NUM", " 7 ");
        assert_eq!(env_or("DB_POOL_TEST_NUM", 42u32), 7);
        std::env::remove_var("DB_POOL_TEST_NUM");
    }

    #[test]
    #[serial_test::serial]
    fn env_flag_parses_common_spellings() {
        std::env::set_var("DB_POOL_TEST_FLAG", "TRUE");
        assert!(env_flag("DB_POOL_TEST_FLAG", false));

        std::env::set_var("DB_POOL_TEST_FLAG", "off");
        assert!(!env_flag("DB_POOL_TEST_FLAG", true));

        std::env::set_var("DB_POOL_TEST_FLAG", "maybe");
        assert!(env_flag("DB_POOL_TEST_FLAG", true));

        std::env::remove_var("DB_POOL_TEST_FLAG");
        assert!(!env_flag("DB_POOL_TEST_FLAG", false));
    }
}

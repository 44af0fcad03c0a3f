/// Get environment variable with MAILER_ prefix, falling back to unprefixed version
///
/// Checks `MAILER_{key}` first, then `{key}`, so the standard `SMTP_*`
/// names keep working while still allowing a per-application override.
///
/// # Examples
///
/// ```rust
/// use template_mailer::utils::get_env_with_prefix;
///
/// // Checks MAILER_SMTP_HOST first, then SMTP_HOST
/// let host = get_env_with_prefix("SMTP_HOST");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("MAILER_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse a boolean flag the way the `SMTP_*` variables are written
/// (`true`/`1`/`yes`, case-insensitive)
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("MAILER_ENV_TEST_VAR", "prefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("MAILER_ENV_TEST_VAR");
        }

        unsafe {
            std::env::set_var("ENV_FALLBACK_VAR", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_FALLBACK_VAR"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ENV_FALLBACK_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_NON_EXISTENT_VAR"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}

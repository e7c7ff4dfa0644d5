//! API key handling.
//!
//! Keys are held as [`secrecy::SecretString`] so they stay out of logs,
//! `Debug` output and error messages.

pub use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the Brave Search subscription token.
pub const BRAVE_API_KEY_ENV: &str = "BRAVE_API_KEY";

/// Read a secret from the environment.
///
/// Unset and blank values are both treated as absent. Surrounding
/// whitespace is dropped.
pub fn secret_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_redacted_in_debug() {
        let secret = SecretString::from("brave-token-123");
        assert!(!format!("{secret:?}").contains("brave-token-123"));
        assert_eq!(secret.expose_secret(), "brave-token-123");
    }

    #[test]
    fn test_from_env_ignores_missing_var() {
        assert!(secret_from_env("OWNER_ENRICHMENT_TEST_UNSET_VAR").is_none());
    }
}

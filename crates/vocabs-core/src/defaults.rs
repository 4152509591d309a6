//! Centralized default constants for the vocabs system.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates should reference these constants instead of defining their
//! own magic values.

// =============================================================================
// VOCABULARY METADATA
// =============================================================================

/// Default namespace URI assigned to schemes created without one.
pub const DEFAULT_NAMESPACE: &str = "https://vocabs.example.org/provide-some-namespace";

/// Default ISO 639 language code for labels and descriptions.
pub const DEFAULT_LANG: &str = "en";

/// Separator used when rendering a concept's full broader-term path.
pub const LABEL_PATH_SEPARATOR: &str = " >> ";

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for autocomplete endpoints.
pub const PAGE_LIMIT_AUTOCOMPLETE: i64 = 10;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes (2 MB, form-sized payloads only).
pub const MAX_BODY_SIZE_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

/// Default namespace, overridable via `VOCABS_DEFAULT_NAMESPACE`.
pub fn default_namespace() -> String {
    std::env::var("VOCABS_DEFAULT_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string())
}

/// Default language, overridable via `VOCABS_DEFAULT_LANG`.
pub fn default_lang() -> String {
    std::env::var("VOCABS_DEFAULT_LANG").unwrap_or_else(|_| DEFAULT_LANG.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lang_fallback() {
        // Env var is unset in the test environment
        assert_eq!(DEFAULT_LANG, "en");
    }

    #[test]
    fn test_path_separator_is_two_char_token() {
        assert_eq!(LABEL_PATH_SEPARATOR.trim(), ">>");
    }
}

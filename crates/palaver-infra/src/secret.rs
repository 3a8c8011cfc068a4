//! API key lookup from the process environment.
//!
//! Keys are read from the variable named by
//! [`ProviderSettings::api_key_var`](palaver_types::config::ProviderSettings::api_key_var)
//! and wrapped in [`SecretString`] straight away so they never reach logs.
//! A `.env` file is loaded into the environment by the binary at startup.

use secrecy::SecretString;

use palaver_types::config::ProviderSettings;
use palaver_types::llm::LlmError;

/// Resolve the API key for `settings` from the environment.
pub fn resolve_api_key(settings: &ProviderSettings) -> Result<SecretString, LlmError> {
    let var = settings.api_key_var();
    lookup_api_key(&var, |name| std::env::var(name).ok())
}

/// Resolve the key stored under `var` using `lookup`.
///
/// Missing, non-Unicode and blank values all count as absent.
pub fn lookup_api_key<L>(var: &str, lookup: L) -> Result<SecretString, LlmError>
where
    L: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => {
            tracing::debug!(var, "API key found in environment");
            Ok(SecretString::from(value.trim().to_string()))
        }
        _ => Err(LlmError::MissingApiKey(var.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_lookup_present_key() {
        let key = lookup_api_key("GOOGLE_API_KEY", |_| Some(" abc123 \n".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "abc123");
    }

    #[test]
    fn test_lookup_missing_key() {
        let err = lookup_api_key("GOOGLE_API_KEY", |_| None).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(ref var) if var == "GOOGLE_API_KEY"));
    }

    #[test]
    fn test_lookup_blank_key_is_missing() {
        let err = lookup_api_key("OPENAI_API_KEY", |_| Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
    }

    #[test]
    fn test_lookup_uses_named_variable() {
        let key = lookup_api_key("MY_KEY", |name| {
            (name == "MY_KEY").then(|| "k".to_string())
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "k");
    }
}

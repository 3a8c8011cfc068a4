//! Configuration and per-provider defaults for OpenAI-compatible providers.
//!
//! Each well-known provider that speaks the OpenAI chat completions protocol
//! gets a factory returning an [`OpenAiCompatConfig`] with its base URL and
//! capabilities.

use secrecy::SecretString;

use palaver_types::llm::ProviderCapabilities;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "mistral").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// Base URL: `https://api.openai.com/v1`; 128K context, 16K output.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Gemini's OpenAI-compatible beta endpoint.
///
/// Base URL: `https://generativelanguage.googleapis.com/v1beta/openai`;
/// 1M context, 64K output.
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "gemini".into(),
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 1_000_000,
            max_output_tokens: 65_536,
        },
    }
}

/// Base URL: `https://api.mistral.ai/v1`; 128K context, 32K output.
pub fn mistral_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "mistral".into(),
        base_url: "https://api.mistral.ai/v1".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 128_000,
            max_output_tokens: 32_768,
        },
    }
}

/// Defaults for a provider by well-known name; unknown names get OpenAI's.
pub fn defaults_for(name: &str, api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    match name {
        "gemini" => gemini_defaults(api_key, model),
        "mistral" => mistral_defaults(api_key, model),
        _ => {
            let mut config = openai_defaults(api_key, model);
            config.provider_name = name.to_string();
            config
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SecretString {
        SecretString::from("test-key")
    }

    #[test]
    fn test_defaults_for_well_known_names() {
        assert_eq!(
            defaults_for("gemini", key(), "gemini-2.0-flash").base_url,
            "https://generativelanguage.googleapis.com/v1beta/openai"
        );
        assert_eq!(
            defaults_for("mistral", key(), "mistral-large-latest").base_url,
            "https://api.mistral.ai/v1"
        );
        assert_eq!(
            defaults_for("openai", key(), "gpt-4o").base_url,
            "https://api.openai.com/v1"
        );
    }

    #[test]
    fn test_unknown_name_keeps_name_with_openai_url() {
        let config = defaults_for("local", key(), "llama3");
        assert_eq!(config.provider_name, "local");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.capabilities.max_output_tokens, 16_384);
    }
}

//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined in
//! `palaver-core`: the native Gemini provider and the OpenAI-compatible
//! provider. [`create_provider`] picks one from [`ProviderSettings`].
//!
//! [`LlmProvider`]: palaver_core::llm::provider::LlmProvider

pub mod gemini;
pub mod openai_compat;

use secrecy::SecretString;
use tracing::info;

use palaver_core::llm::box_provider::BoxLlmProvider;
use palaver_types::config::ProviderSettings;
use palaver_types::llm::{LlmError, ProviderType};

use self::gemini::GeminiProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, defaults_for};

/// Create a [`BoxLlmProvider`] from [`ProviderSettings`].
///
/// `api_key` is the already-resolved credential (see
/// [`crate::secret::resolve_api_key`]).
pub fn create_provider(
    settings: &ProviderSettings,
    api_key: SecretString,
) -> Result<BoxLlmProvider, LlmError> {
    let provider = match settings.provider_type {
        ProviderType::Gemini => {
            let mut provider = GeminiProvider::new(api_key, settings.model.clone())?;
            if let Some(base_url) = settings.base_url.as_deref() {
                provider = provider.with_base_url(base_url);
            }
            BoxLlmProvider::new(provider)
        }
        ProviderType::OpenAiCompatible => {
            let mut config: OpenAiCompatConfig =
                defaults_for(&settings.name, api_key, &settings.model);
            if let Some(base_url) = settings.base_url.as_deref() {
                config.base_url = base_url.to_string();
            }
            BoxLlmProvider::new(OpenAiCompatibleProvider::new(config))
        }
    };

    info!(
        provider = provider.name(),
        provider_type = %settings.provider_type,
        model = %settings.model,
        "LLM provider created"
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_gemini_default() {
        let settings = ProviderSettings::default();
        let provider = create_provider(&settings, SecretString::from("key")).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert!(provider.capabilities().streaming);
    }

    #[test]
    fn test_create_provider_openai_compatible() {
        let settings = ProviderSettings {
            provider_type: ProviderType::OpenAiCompatible,
            name: "mistral".to_string(),
            model: "mistral-small-latest".to_string(),
            ..ProviderSettings::default()
        };
        let provider = create_provider(&settings, SecretString::from("key")).unwrap();
        assert_eq!(provider.name(), "mistral");
        assert_eq!(provider.capabilities().max_output_tokens, 32_768);
    }

    #[test]
    fn test_create_provider_custom_base_url() {
        let settings = ProviderSettings {
            provider_type: ProviderType::OpenAiCompatible,
            name: "local".to_string(),
            model: "llama3".to_string(),
            base_url: Some("http://localhost:11434/v1".to_string()),
            api_key_env: Some("LOCAL_KEY".to_string()),
        };
        let provider = create_provider(&settings, SecretString::from("key")).unwrap();
        assert_eq!(provider.name(), "local");
    }
}

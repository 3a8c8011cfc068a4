//! Global configuration types for Palaver.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! LLM provider and model and controls generation settings.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level configuration.
///
/// Loaded from `~/.palaver/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub generation: GenerationSettings,
}

/// Which backend to talk to and how to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub provider_type: ProviderType,

    /// Provider name; for OpenAI-compatible backends a well-known name
    /// ("openai", "gemini", "mistral") selects the base URL.
    #[serde(default = "default_provider_name")]
    pub name: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key. Defaults per provider.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_provider_name() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::default(),
            name: default_provider_name(),
            model: default_model(),
            base_url: None,
            api_key_env: None,
        }
    }
}

impl ProviderSettings {
    /// Environment variable to read the API key from.
    pub fn api_key_var(&self) -> String {
        if let Some(var) = &self.api_key_env {
            return var.clone();
        }
        match (&self.provider_type, self.name.as_str()) {
            (ProviderType::Gemini, _) | (ProviderType::OpenAiCompatible, "gemini") => {
                "GOOGLE_API_KEY".to_string()
            }
            (ProviderType::OpenAiCompatible, "mistral") => "MISTRAL_API_KEY".to_string(),
            (ProviderType::OpenAiCompatible, _) => "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Per-request generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Sampling temperature; `None` uses the provider default.
    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_max_tokens() -> u32 {
    8_192
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: default_max_tokens(),
            system_prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.provider.provider_type, ProviderType::Gemini);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.generation.max_tokens, 8_192);
        assert!(config.generation.temperature.is_none());
    }

    #[test]
    fn test_global_config_deserialize_empty() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider.name, "gemini");
        assert_eq!(config.generation.max_tokens, 8_192);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[provider]
provider_type = "openai_compatible"
name = "openai"
model = "gpt-4o"

[generation]
temperature = 0.4
max_tokens = 2048
system_prompt = "Be brief."
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.provider_type, ProviderType::OpenAiCompatible);
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.generation.max_tokens, 2048);
        assert_eq!(config.generation.system_prompt.as_deref(), Some("Be brief."));
        assert!((config.generation.temperature.unwrap() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_api_key_var_defaults() {
        let gemini = ProviderSettings::default();
        assert_eq!(gemini.api_key_var(), "GOOGLE_API_KEY");

        let openai = ProviderSettings {
            provider_type: ProviderType::OpenAiCompatible,
            name: "openai".to_string(),
            ..ProviderSettings::default()
        };
        assert_eq!(openai.api_key_var(), "OPENAI_API_KEY");

        let custom = ProviderSettings {
            api_key_env: Some("MY_KEY".to_string()),
            ..ProviderSettings::default()
        };
        assert_eq!(custom.api_key_var(), "MY_KEY");
    }
}

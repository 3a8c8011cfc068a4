//! Application state wiring services together.
//!
//! `AppState` resolves the data directory and configuration once. The chat
//! service is built on demand because it needs provider credentials, which
//! browsing commands do not.

use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use palaver_core::chat::remote::ChatSettings;
use palaver_core::chat::service::ChatService;
use palaver_infra::config::load_global_config;
use palaver_infra::filesystem::chat::FileChatRepository;
use palaver_infra::filesystem::resolve_data_dir;
use palaver_infra::llm::create_provider;
use palaver_infra::secret::resolve_api_key;
use palaver_types::config::GlobalConfig;

/// Concrete chat service pinned to the JSON-file repository.
pub type ConcreteChatService = ChatService<FileChatRepository>;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: GlobalConfig,
    pub repo: FileChatRepository,
}

impl AppState {
    /// Resolve the data directory and load `config.toml`.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;
        debug!(
            data_dir = %data_dir.display(),
            provider = %config.provider.provider_type,
            model = %config.provider.model,
            "Application state initialized"
        );

        Ok(Self {
            repo: FileChatRepository::local(&data_dir),
            data_dir,
            config,
        })
    }

    /// Build the chat service, resolving the provider API key.
    pub fn chat_service(&self, model_override: Option<&str>) -> anyhow::Result<ConcreteChatService> {
        let mut provider_settings = self.config.provider.clone();
        if let Some(model) = model_override {
            provider_settings.model = model.to_string();
        }

        let api_key = resolve_api_key(&provider_settings).with_context(|| {
            format!(
                "no API key for provider '{}'; set {} in the environment or a .env file",
                provider_settings.name,
                provider_settings.api_key_var()
            )
        })?;
        let provider = create_provider(&provider_settings, api_key)?;

        let config = GlobalConfig {
            provider: provider_settings,
            generation: self.config.generation.clone(),
        };

        Ok(ChatService::new(
            FileChatRepository::local(&self.data_dir),
            provider,
            ChatSettings::from_config(&config),
        ))
    }
}

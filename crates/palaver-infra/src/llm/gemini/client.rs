//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Talks to the native `v1beta` API: `generateContent` for `complete` and
//! `streamGenerateContent?alt=sse` for `stream`. The API key travels in the
//! `x-goog-api-key` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use palaver_core::llm::provider::{EventStream, LlmProvider};
use palaver_types::history::{HistoryContent, HistoryPart};
use palaver_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities, Usage,
};

use super::streaming::{create_gemini_stream, map_finish_reason, map_status_error};
use super::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, SystemInstruction,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini LLM provider.
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// building request headers. Does not derive `Debug`.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, model: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let capabilities = Self::capabilities_for_model(&model);

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            capabilities,
        })
    }

    /// Override the base URL (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn capabilities_for_model(model: &str) -> ProviderCapabilities {
        if model.contains("pro") {
            ProviderCapabilities {
                streaming: true,
                max_context_tokens: 2_097_152,
                max_output_tokens: 8_192,
            }
        } else {
            ProviderCapabilities {
                streaming: true,
                max_context_tokens: 1_048_576,
                max_output_tokens: 8_192,
            }
        }
    }

    /// Full URL for `method` on the request's model (or the default model).
    fn url(&self, request: &CompletionRequest, method: &str) -> String {
        let model = if request.model.is_empty() {
            &self.model
        } else {
            &request.model
        };
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{model}:{method}", self.base_url)
    }

    fn to_gemini_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| match m.role {
                MessageRole::User => HistoryContent::user(m.content.clone()),
                MessageRole::Assistant => HistoryContent::model(m.content.clone()),
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: request.system.as_ref().map(|system| SystemInstruction {
                parts: vec![HistoryPart {
                    text: system.clone(),
                }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_gemini_request(request);
        let url = self.url(request, "generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), &error_body));
        }

        let gemini_resp: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let usage = gemini_resp
            .usage_metadata
            .as_ref()
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: gemini_resp.response_id.clone().unwrap_or_default(),
            content: gemini_resp.text(),
            model: gemini_resp
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            stop_reason: map_finish_reason(gemini_resp.finish_reason().unwrap_or("STOP")),
            usage,
        })
    }

    fn stream(&self, request: CompletionRequest) -> EventStream {
        let body = self.to_gemini_request(&request);
        let url = format!("{}?alt=sse", self.url(&request, "streamGenerateContent"));

        create_gemini_stream(&self.client, &url, body, &self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_types::history::HistoryRole;
    use palaver_types::llm::Message;

    fn make_provider() -> GeminiProvider {
        GeminiProvider::new(
            SecretString::from("test-key-not-real"),
            "gemini-2.0-flash".to_string(),
        )
        .unwrap()
    }

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.0-flash".to_string(),
            messages,
            system: Some("Be brief.".to_string()),
            max_tokens: 512,
            temperature: Some(0.2),
            stream: true,
        }
    }

    #[test]
    fn test_provider_name_and_capabilities() {
        let provider = make_provider();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.0-flash");
        assert!(provider.capabilities().streaming);
        assert_eq!(provider.capabilities().max_context_tokens, 1_048_576);
    }

    #[test]
    fn test_stream_url() {
        let provider = make_provider();
        let url = provider.url(&request(vec![]), "streamGenerateContent");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:streamGenerateContent"
        );
    }

    #[test]
    fn test_url_strips_models_prefix_and_uses_base_url() {
        let provider = make_provider().with_base_url("https://proxy.example.com/");
        let mut req = request(vec![]);
        req.model = "models/gemini-1.5-pro".to_string();
        assert_eq!(
            provider.url(&req, "generateContent"),
            "https://proxy.example.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_to_gemini_request_maps_roles() {
        let provider = make_provider();
        let body = provider.to_gemini_request(&request(vec![
            Message {
                role: MessageRole::User,
                content: "hello".to_string(),
            },
            Message {
                role: MessageRole::Assistant,
                content: "Hi there".to_string(),
            },
        ]));

        assert_eq!(body.contents.len(), 2);
        assert_eq!(body.contents[0].role, HistoryRole::User);
        assert_eq!(body.contents[1].role, HistoryRole::Model);
        assert_eq!(body.contents[1].text(), "Hi there");
        assert_eq!(
            body.system_instruction.unwrap().parts[0].text,
            "Be brief."
        );
        assert_eq!(body.generation_config.max_output_tokens, 512);
    }
}

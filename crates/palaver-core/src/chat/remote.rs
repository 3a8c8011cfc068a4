//! Remote chat handle.
//!
//! A `RemoteChat` is one provider-side conversation: it owns the model
//! history, turns a user message into a `CompletionRequest`, and exposes the
//! reply as a lazy stream of text fragments. History only grows when a reply
//! completes successfully with text, so every request the handle sends is a
//! well-formed alternating user/model conversation.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{debug, info_span};

use palaver_types::config::GlobalConfig;
use palaver_types::history::HistoryContent;
use palaver_types::llm::{CompletionRequest, LlmError, Message, StreamEvent};

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::instrument::StreamInSpan;

/// Stream of reply fragments returned by [`RemoteChat::send`].
pub type FragmentStream<'a> = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'a>>;

/// Request parameters shared by every message in a conversation.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

impl ChatSettings {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            model: config.provider.model.clone(),
            system_prompt: config.generation.system_prompt.clone(),
            max_tokens: config.generation.max_tokens,
            temperature: config.generation.temperature,
        }
    }
}

/// Handle to one provider-side conversation.
pub struct RemoteChat {
    provider: Arc<BoxLlmProvider>,
    settings: ChatSettings,
    history: Vec<HistoryContent>,
}

impl RemoteChat {
    /// Open a conversation seeded with `history`, in order.
    ///
    /// An empty history starts a fresh context.
    pub fn start(
        provider: Arc<BoxLlmProvider>,
        settings: ChatSettings,
        history: Vec<HistoryContent>,
    ) -> Self {
        debug!(
            provider = provider.name(),
            model = %settings.model,
            seeded = history.len(),
            "Remote chat started"
        );
        Self {
            provider,
            settings,
            history,
        }
    }

    /// The conversation as the provider currently sees it.
    pub fn history(&self) -> &[HistoryContent] {
        &self.history
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Build the request for the next user message without sending it.
    pub fn build_request(&self, text: &str) -> CompletionRequest {
        let mut messages: Vec<Message> = self.history.iter().map(HistoryContent::to_message).collect();
        messages.push(Message {
            role: palaver_types::llm::MessageRole::User,
            content: text.to_string(),
        });

        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: self.settings.system_prompt.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream: self.provider.capabilities().streaming,
        }
    }

    /// Send a user message and stream back the reply fragments.
    ///
    /// Nothing happens until the returned stream is polled. The stream is
    /// finite and cannot be restarted. On success with a non-empty reply the
    /// user and model entries are appended to the history; on error or an
    /// empty reply the history is left as it was.
    pub fn send(&mut self, text: &str) -> FragmentStream<'_> {
        let request = self.build_request(text);
        let provider = Arc::clone(&self.provider);
        let history = &mut self.history;
        let user_text = text.to_string();

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = request.stream,
        );

        let fragments = async_stream::stream! {
            let mut reply = String::new();

            if request.stream {
                let mut events = provider.stream(request);
                while let Some(event) = events.next().await {
                    match event {
                        Ok(StreamEvent::TextDelta { text }) => {
                            reply.push_str(&text);
                            yield Ok(text);
                        }
                        Ok(StreamEvent::MessageDelta { stop_reason }) => {
                            debug!(%stop_reason, "Reply finished");
                        }
                        Ok(StreamEvent::Usage(usage)) => {
                            debug!(
                                input_tokens = usage.input_tokens,
                                output_tokens = usage.output_tokens,
                                "Token usage"
                            );
                        }
                        Ok(StreamEvent::Done) => break,
                        Ok(StreamEvent::Connected) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            } else {
                match provider.complete(&request).await {
                    Ok(response) => {
                        debug!(stop_reason = %response.stop_reason, "Reply finished");
                        reply.push_str(&response.content);
                        yield Ok(response.content);
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            if !reply.is_empty() {
                history.push(HistoryContent::user(user_text));
                history.push(HistoryContent::model(reply));
            }
        };

        Box::pin(StreamInSpan::new(fragments, span))
    }
}

//! SSE stream handling for Gemini `streamGenerateContent?alt=sse`.
//!
//! Each `data:` payload is a complete `GenerateContentResponse` chunk. Gemini
//! has no `[DONE]` sentinel: the stream simply ends, and the last chunk
//! carries the finish reason and cumulative usage. An `{"error": ...}`
//! payload may appear mid-stream.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};

use palaver_core::llm::provider::EventStream;
use palaver_types::llm::{LlmError, StopReason, StreamEvent, Usage};

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Running state across chunks of one stream.
#[derive(Debug, Default)]
pub struct StreamState {
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// Open a streaming connection and map it to [`StreamEvent`]s.
///
/// The request is only sent once the returned stream is first polled.
pub fn create_gemini_stream(
    client: &reqwest::Client,
    url: &str,
    body: GenerateContentRequest,
    api_key: &SecretString,
) -> EventStream {
    let client = client.clone();
    let url = url.to_string();
    let api_key = api_key.clone();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, "Gemini stream API error response");
            Err::<(), _>(map_status_error(status.as_u16(), &error_body))?;
            return;
        }

        yield StreamEvent::Connected;

        let mut state = StreamState::default();
        let mut events = response.bytes_stream().eventsource();

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }
            let chunk = parse_chunk(&event.data)?;
            for ev in chunk_events(&chunk, &mut state) {
                yield ev;
            }
        }

        for ev in finish_events(state) {
            yield ev;
        }
    })
}

/// Parse one SSE `data:` payload.
pub fn parse_chunk(data: &str) -> Result<GenerateContentResponse, LlmError> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(data) {
        return Err(api_error(envelope));
    }
    serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("gemini stream chunk: {e}")))
}

/// Text events for one chunk; records finish reason and usage in `state`.
pub fn chunk_events(chunk: &GenerateContentResponse, state: &mut StreamState) -> Vec<StreamEvent> {
    if let Some(usage) = &chunk.usage_metadata {
        state.usage = Some(Usage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        });
    }
    if let Some(reason) = chunk.finish_reason() {
        state.finish_reason = Some(reason.to_string());
    }

    let text = chunk.text();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![StreamEvent::TextDelta { text }]
    }
}

/// Trailing events once the byte stream ends.
pub fn finish_events(state: StreamState) -> Vec<StreamEvent> {
    let mut events = Vec::with_capacity(3);
    if let Some(reason) = state.finish_reason.as_deref() {
        events.push(StreamEvent::MessageDelta {
            stop_reason: map_finish_reason(reason),
        });
    }
    if let Some(usage) = state.usage {
        events.push(StreamEvent::Usage(usage));
    }
    events.push(StreamEvent::Done);
    events
}

pub fn map_finish_reason(reason: &str) -> StopReason {
    match reason {
        "MAX_TOKENS" => StopReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            StopReason::ContentFilter
        }
        _ => StopReason::EndTurn,
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`].
pub fn map_status_error(status: u16, body: &str) -> LlmError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());

    if body.contains("API_KEY_INVALID") {
        return LlmError::AuthenticationFailed;
    }
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        400 | 404 => LlmError::InvalidRequest(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

fn api_error(envelope: ErrorEnvelope) -> LlmError {
    match envelope.error.status.as_deref() {
        Some("RESOURCE_EXHAUSTED") => LlmError::RateLimited {
            retry_after_ms: None,
        },
        Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED") => LlmError::AuthenticationFailed,
        _ => LlmError::Provider {
            message: envelope.error.message,
        },
    }
}

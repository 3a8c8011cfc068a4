//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] chunks to the
//! provider-agnostic [`StreamEvent`] enum defined in `palaver-types`.

use futures_util::StreamExt;

use async_openai::types::chat::{ChatCompletionResponseStream, FinishReason};

use palaver_core::llm::provider::EventStream;
use palaver_types::llm::{LlmError, StopReason, StreamEvent, Usage};

/// Map an async-openai [`ChatCompletionResponseStream`] to a stream of [`StreamEvent`]s.
///
/// Emits `Connected`, then `TextDelta` per content chunk, `MessageDelta` when
/// a finish reason arrives, `Usage` when the server reports it, and `Done`.
pub fn map_openai_stream(stream: ChatCompletionResponseStream) -> EventStream {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            // With include_usage the final chunk carries usage and no choices.
            if let Some(usage) = &chunk.usage {
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }

            for choice in &chunk.choices {
                if let Some(text) = &choice.delta.content {
                    if !text.is_empty() {
                        yield StreamEvent::TextDelta { text: text.clone() };
                    }
                }

                if let Some(finish_reason) = &choice.finish_reason {
                    yield StreamEvent::MessageDelta {
                        stop_reason: map_finish_reason(finish_reason),
                    };
                }
            }
        }

        yield StreamEvent::Done;
    })
}

pub fn map_finish_reason(reason: &FinishReason) -> StopReason {
    match reason {
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        FinishReason::Stop | FinishReason::ToolCalls | FinishReason::FunctionCall => {
            StopReason::EndTurn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_to_stop_reason_mapping() {
        let cases = vec![
            (FinishReason::Stop, StopReason::EndTurn),
            (FinishReason::Length, StopReason::MaxTokens),
            (FinishReason::ContentFilter, StopReason::ContentFilter),
            (FinishReason::ToolCalls, StopReason::EndTurn),
            (FinishReason::FunctionCall, StopReason::EndTurn),
        ];

        for (finish, expected) in cases {
            assert_eq!(map_finish_reason(&finish), expected);
        }
    }
}

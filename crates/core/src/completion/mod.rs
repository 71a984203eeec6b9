//! # Completion Collaborators
//!
//! Streaming chat-completion providers. Each agent's answer arrives as a
//! finite, cancelable lazy sequence of text chunks - consumers pull chunks
//! until exhaustion or cancellation and never buffer the whole answer
//! except for the final knowledge-merge concatenation.
//!
//! Two interchangeable implementations: OpenRouter (an OpenAI-compatible
//! gateway) and Moonshot AI (direct vendor). Both speak the OpenAI
//! chat/completions wire format with `stream: true`, so the SSE decoding
//! and delta extraction live here and are shared.

pub mod moonshot;
pub mod openrouter;

use std::pin::Pin;
use std::str::FromStr;

use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompletionError;

pub use moonshot::MoonshotProvider;
pub use openrouter::OpenRouterProvider;

/// Lazy sequence of text chunks from a completion provider.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

/// A streaming chat-completion collaborator.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name, used in logs and events.
    fn name(&self) -> &'static str;

    /// Open a completion stream for one prompt. The system prompt carries
    /// the agent instructions and serialized knowledge context.
    async fn stream_completion(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<ChunkStream, CompletionError>;
}

/// Supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    OpenRouter,
    Moonshot,
}

impl CompletionKind {
    /// Default model when the configuration does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            CompletionKind::OpenRouter => "openai/gpt-4-turbo",
            CompletionKind::Moonshot => "moonshot-v1-8k",
        }
    }
}

impl FromStr for CompletionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(CompletionKind::OpenRouter),
            "moonshot" | "moonshotai" => Ok(CompletionKind::Moonshot),
            other => Err(format!("unknown completion provider: {other}")),
        }
    }
}

/// Turn a successful streaming HTTP response into a [`ChunkStream`].
///
/// Decodes SSE messages, stops at the `[DONE]` sentinel, and extracts the
/// text delta from each OpenAI-style chunk. Messages without a text delta
/// (role preludes, usage frames) are skipped, not errors.
pub(crate) fn sse_chunk_stream(response: reqwest::Response) -> ChunkStream {
    let events = response.bytes_stream().eventsource();

    Box::pin(try_stream! {
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| CompletionError::Stream(e.to_string()))?;
            if event.data.trim() == "[DONE]" {
                break;
            }
            if let Some(text) = extract_delta(&event.data) {
                yield text;
            }
        }
    })
}

/// Pull `choices[0].delta.content` out of one chunk payload.
fn extract_delta(data: &str) -> Option<String> {
    let value: Value = serde_json::from_str(data).ok()?;
    let text = value["choices"][0]["delta"]["content"].as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Check the HTTP status of a completion response before streaming from it.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, CompletionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CompletionError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "openrouter".parse::<CompletionKind>().unwrap(),
            CompletionKind::OpenRouter
        );
        assert_eq!(
            "MoonshotAI".parse::<CompletionKind>().unwrap(),
            CompletionKind::Moonshot
        );
        assert!("hal9000".parse::<CompletionKind>().is_err());
    }

    #[test]
    fn test_extract_delta() {
        let chunk = r#"{"choices":[{"delta":{"content":"Alan "}}]}"#;
        assert_eq!(extract_delta(chunk), Some("Alan ".to_string()));
    }

    #[test]
    fn test_extract_delta_skips_role_prelude() {
        let chunk = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(extract_delta(chunk), None);
    }

    #[test]
    fn test_extract_delta_skips_garbage() {
        assert_eq!(extract_delta("not json"), None);
        assert_eq!(extract_delta(r#"{"choices":[]}"#), None);
    }
}

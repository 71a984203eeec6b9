//! OpenRouter completion client - an OpenAI-compatible gateway.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::CompletionError;

use super::{ensure_success, sse_chunk_stream, ChunkStream, CompletionKind, CompletionProvider};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub struct OpenRouterProvider {
    api_key: Option<String>,
    model: String,
    /// Sent as the HTTP referer, which OpenRouter uses for app attribution
    referer: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(config: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            api_key: config.openrouter_api_key.clone(),
            model: config
                .completion_model
                .clone()
                .unwrap_or_else(|| CompletionKind::OpenRouter.default_model().to_string()),
            referer: config.frontend_url.clone(),
            client,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn stream_completion(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<ChunkStream, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey("OPENROUTER_API_KEY"))?;

        debug!(model = %self.model, "opening openrouter completion stream");

        let response = self
            .client
            .post(format!("{OPENROUTER_BASE_URL}/chat/completions"))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": prompt },
                ],
                "temperature": 0.7,
                "max_tokens": 2000,
                "stream": true,
            }))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(sse_chunk_stream(response))
    }
}

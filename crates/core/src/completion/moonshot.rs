//! Moonshot AI completion client (direct vendor integration).

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::CompletionError;

use super::{ensure_success, sse_chunk_stream, ChunkStream, CompletionKind, CompletionProvider};

const MOONSHOT_BASE_URL: &str = "https://api.moonshot.cn/v1";

pub struct MoonshotProvider {
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl MoonshotProvider {
    pub fn new(config: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            api_key: config.moonshot_api_key.clone(),
            model: config
                .completion_model
                .clone()
                .unwrap_or_else(|| CompletionKind::Moonshot.default_model().to_string()),
            client,
        }
    }
}

#[async_trait]
impl CompletionProvider for MoonshotProvider {
    fn name(&self) -> &'static str {
        "moonshot"
    }

    async fn stream_completion(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<ChunkStream, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey("MOONSHOTAI_API_KEY"))?;

        debug!(model = %self.model, "opening moonshot completion stream");

        let response = self
            .client
            .post(format!("{MOONSHOT_BASE_URL}/chat/completions"))
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
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

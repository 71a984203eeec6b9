//! Google Gemini planning client (`generateContent` REST API).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::plan::{parse_plan_response, Plan};
use crate::session::prompts::build_orchestrator_prompt;

use super::{Planner, PLAN_FORMAT_INSTRUCTIONS};

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiPlanner {
    api_key: Option<String>,
    max_agents: usize,
    client: reqwest::Client,
}

impl GeminiPlanner {
    pub fn new(config: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            api_key: config.google_api_key.clone(),
            max_agents: config.max_plan_agents,
            client,
        }
    }
}

#[async_trait]
impl Planner for GeminiPlanner {
    async fn generate_plan(&self, query: &str) -> Result<Plan, PlanError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PlanError::MissingApiKey("GOOGLE_API_KEY"))?;

        let text = format!(
            "System: {}\n\nUser Query: {}\n\n{}",
            build_orchestrator_prompt(),
            query,
            PLAN_FORMAT_INSTRUCTIONS
        );

        let url = format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": text }] }
                ],
                "generationConfig": {
                    "temperature": 0.7,
                    "maxOutputTokens": 2000,
                }
            }))
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        let content = data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(PlanError::EmptyResponse)?;

        debug!(chars = content.len(), "gemini planning response received");
        parse_plan_response(content, self.max_agents)
    }
}

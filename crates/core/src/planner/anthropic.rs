//! Anthropic Claude planning client (`/v1/messages` REST API).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::plan::{parse_plan_response, Plan};
use crate::session::prompts::build_orchestrator_prompt;

use super::{Planner, PLAN_FORMAT_INSTRUCTIONS};

const ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";
const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicPlanner {
    api_key: Option<String>,
    max_agents: usize,
    client: reqwest::Client,
}

impl AnthropicPlanner {
    pub fn new(config: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            api_key: config.anthropic_api_key.clone(),
            max_agents: config.max_plan_agents,
            client,
        }
    }
}

#[async_trait]
impl Planner for AnthropicPlanner {
    async fn generate_plan(&self, query: &str) -> Result<Plan, PlanError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PlanError::MissingApiKey("ANTHROPIC_API_KEY"))?;

        let response = self
            .client
            .post(ANTHROPIC_ENDPOINT)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&json!({
                "model": ANTHROPIC_MODEL,
                "max_tokens": 2000,
                "system": build_orchestrator_prompt(),
                "messages": [
                    {
                        "role": "user",
                        "content": format!("{query}\n\n{PLAN_FORMAT_INSTRUCTIONS}"),
                    }
                ]
            }))
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        let content = data["content"][0]["text"]
            .as_str()
            .ok_or(PlanError::EmptyResponse)?;

        debug!(chars = content.len(), "anthropic planning response received");
        parse_plan_response(content, self.max_agents)
    }
}

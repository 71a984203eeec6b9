//! # Planning Collaborators
//!
//! Turns a user query into a structured [`Plan`] with one LLM call.
//! Two interchangeable implementations: Google Gemini (default) and
//! Anthropic Claude. Both return raw text that is parsed and validated by
//! [`crate::plan::parse_plan_response`] before anything trusts it.

pub mod anthropic;
pub mod gemini;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::plan::Plan;

pub use anthropic::AnthropicPlanner;
pub use gemini::GeminiPlanner;

/// Instruction suffix appended to every planning request so the model
/// answers with the expected JSON shape.
pub(crate) const PLAN_FORMAT_INSTRUCTIONS: &str = r#"Please respond with a JSON object containing:
- response: A brief description of your plan
- agents: An array of agent objects, each with "task" and "prompt" fields"#;

/// A planning collaborator: query in, validated plan out.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn generate_plan(&self, query: &str) -> Result<Plan, PlanError>;
}

/// Supported planning providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanProvider {
    Google,
    Anthropic,
}

impl PlanProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanProvider::Google => "google",
            PlanProvider::Anthropic => "anthropic",
        }
    }
}

impl FromStr for PlanProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gemini" => Ok(PlanProvider::Google),
            "anthropic" | "claude" => Ok(PlanProvider::Anthropic),
            other => Err(format!("unknown plan provider: {other}")),
        }
    }
}

/// Build the configured planner, sharing the process-wide HTTP client.
pub fn planner_for(
    provider: PlanProvider,
    config: &AppConfig,
    client: reqwest::Client,
) -> Arc<dyn Planner> {
    match provider {
        PlanProvider::Google => Arc::new(GeminiPlanner::new(config, client)),
        PlanProvider::Anthropic => Arc::new(AnthropicPlanner::new(config, client)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<PlanProvider>().unwrap(), PlanProvider::Google);
        assert_eq!("GEMINI".parse::<PlanProvider>().unwrap(), PlanProvider::Google);
        assert_eq!(
            "anthropic".parse::<PlanProvider>().unwrap(),
            PlanProvider::Anthropic
        );
        assert!("mystery".parse::<PlanProvider>().is_err());
    }
}

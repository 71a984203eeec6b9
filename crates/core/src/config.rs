//! # Process Configuration
//!
//! One immutable configuration value built from the environment at startup
//! and passed explicitly into whichever component needs it. Nothing in the
//! core reads environment variables after construction, so sessions stay
//! independently testable with substitute collaborators.

use std::time::Duration;

use crate::completion::CompletionKind;
use crate::planner::PlanProvider;
use crate::search::SearchProviderKind;

/// Default agent cap applied to plans returned by the planning collaborator.
pub const DEFAULT_MAX_PLAN_AGENTS: usize = 8;

/// Process-wide configuration: provider selection, credentials, and timeouts.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Which planning collaborator generates the session plan
    pub plan_provider: PlanProvider,
    /// Which completion collaborator the agents stream from
    pub completion_provider: CompletionKind,
    /// Default web search provider
    pub search_provider: SearchProviderKind,
    /// Model override for the completion provider (provider default if unset)
    pub completion_model: Option<String>,

    // API credentials (each optional; a missing key fails at call time)
    pub google_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub moonshot_api_key: Option<String>,
    pub brave_api_key: Option<String>,
    pub zenserp_api_key: Option<String>,

    /// Allowed origin for cross-origin calls, also sent as the OpenRouter referer
    pub frontend_url: String,

    /// Upper bound on the whole planning call
    pub plan_timeout: Duration,
    /// Upper bound on opening a completion stream
    pub completion_connect_timeout: Duration,
    /// Upper bound on the gap between consecutive completion chunks
    pub chunk_idle_timeout: Duration,
    /// Upper bound on one search provider call
    pub search_timeout: Duration,
    /// Upper bound on one page fetch
    pub page_fetch_timeout: Duration,

    /// Plans with more agents than this are rejected as session-fatal
    pub max_plan_agents: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            plan_provider: PlanProvider::Google,
            completion_provider: CompletionKind::OpenRouter,
            search_provider: SearchProviderKind::Brave,
            completion_model: None,
            google_api_key: None,
            anthropic_api_key: None,
            openrouter_api_key: None,
            moonshot_api_key: None,
            brave_api_key: None,
            zenserp_api_key: None,
            frontend_url: "http://localhost:3000".to_string(),
            plan_timeout: Duration::from_secs(30),
            completion_connect_timeout: Duration::from_secs(30),
            chunk_idle_timeout: Duration::from_secs(60),
            search_timeout: Duration::from_secs(15),
            page_fetch_timeout: Duration::from_secs(10),
            max_plan_agents: DEFAULT_MAX_PLAN_AGENTS,
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Unknown provider names fall back to the defaults rather than failing,
    /// matching the behavior of the settings layer this replaces.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            plan_provider: env_var("PLAN_PROVIDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.plan_provider),
            completion_provider: env_var("COMPLETION_PROVIDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.completion_provider),
            search_provider: env_var("SEARCH_PROVIDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.search_provider),
            completion_model: env_var("COMPLETION_MODEL"),
            google_api_key: env_var("GOOGLE_API_KEY").or_else(|| env_var("GEMINI_API_KEY")),
            anthropic_api_key: env_var("ANTHROPIC_API_KEY"),
            openrouter_api_key: env_var("OPENROUTER_API_KEY"),
            moonshot_api_key: env_var("MOONSHOTAI_API_KEY"),
            brave_api_key: env_var("BRAVE_SEARCH_API_KEY").or_else(|| env_var("BRAVE_API_KEY")),
            zenserp_api_key: env_var("ZENSERP_API_KEY").or_else(|| env_var("SERPAPI_API_KEY")),
            frontend_url: env_var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            plan_timeout: env_secs("PLAN_TIMEOUT_SECS", defaults.plan_timeout),
            completion_connect_timeout: env_secs(
                "COMPLETION_CONNECT_TIMEOUT_SECS",
                defaults.completion_connect_timeout,
            ),
            chunk_idle_timeout: env_secs("CHUNK_IDLE_TIMEOUT_SECS", defaults.chunk_idle_timeout),
            search_timeout: env_secs("SEARCH_TIMEOUT_SECS", defaults.search_timeout),
            page_fetch_timeout: env_secs("PAGE_FETCH_TIMEOUT_SECS", defaults.page_fetch_timeout),
            max_plan_agents: env_var("MAX_PLAN_AGENTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_plan_agents),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(key: &str, default: Duration) -> Duration {
    env_var(key)
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.plan_provider, PlanProvider::Google);
        assert_eq!(config.completion_provider, CompletionKind::OpenRouter);
        assert_eq!(config.search_provider, SearchProviderKind::Brave);
        assert_eq!(config.max_plan_agents, DEFAULT_MAX_PLAN_AGENTS);
    }

    #[test]
    fn test_default_timeouts_bounded() {
        let config = AppConfig::default();
        assert_eq!(config.plan_timeout, Duration::from_secs(30));
        assert_eq!(config.page_fetch_timeout, Duration::from_secs(10));
        assert!(config.chunk_idle_timeout > config.completion_connect_timeout);
    }
}

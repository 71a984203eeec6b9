//! # Error Taxonomy
//!
//! Three scopes of failure, kept deliberately flat so every error the user
//! sees corresponds to exactly one failed collaborator call:
//!
//! - [`PlanError`] - session-fatal: the session aborts before any agent runs
//! - [`AgentError`] / [`CompletionError`] - agent-scoped: the session skips
//!   the failed agent and continues the plan
//! - [`AgentError::Disconnected`] - transport failure: silent termination,
//!   nothing left to write to
//!
//! No collaborator call is retried automatically.

use thiserror::Error;

/// Planning-stage failures. All of these abort the session.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),

    #[error("planner request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("planner returned an empty response")]
    EmptyResponse,

    #[error("failed to parse plan as JSON: {0}")]
    Malformed(String),

    #[error("plan contains {count} agents, exceeding the cap of {max}")]
    TooManyAgents { count: usize, max: usize },

    #[error("plan contains an agent with an empty task label")]
    UnlabeledAgent,

    #[error("planning call timed out")]
    Timeout,
}

/// Completion provider failures, including mid-stream ones.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),

    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion stream error: {0}")]
    Stream(String),
}

/// Failure of a single agent within a session.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("completion collaborator timed out")]
    Timeout,

    /// The client went away; not surfaced as an event.
    #[error("client disconnected")]
    Disconnected,
}

/// Search and page-fetch collaborator failures. Provider HTTP errors
/// surface through `Http` via `error_for_status`.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),

    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unknown search provider: {0}")]
    UnknownProvider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_wraps_completion() {
        let err: AgentError = CompletionError::Stream("connection reset".to_string()).into();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_too_many_agents_message() {
        let err = PlanError::TooManyAgents { count: 12, max: 8 };
        assert_eq!(
            err.to_string(),
            "plan contains 12 agents, exceeding the cap of 8"
        );
    }
}

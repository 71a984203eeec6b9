//! # Session Events
//!
//! The outward-facing event stream of one session. Each event is serialized
//! as one JSON message on the wire, tagged by `type`.
//!
//! Ordering invariant: `Plan` is always first and appears exactly once; for
//! a given agent label, `AgentStart` precedes all its `Response` chunks,
//! which precede its `AgentEnd`; `Error` may appear at any point.

use serde::{Deserialize, Serialize};

use crate::plan::Plan;

/// A lifecycle event of one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// The validated plan, emitted before any agent events
    Plan { plan: Plan },
    /// An agent is about to run
    AgentStart {
        agent: String,
        task: String,
        prompt: String,
    },
    /// One streamed chunk of an agent's answer
    Response { agent: String, data: String },
    /// An agent finished cleanly
    AgentEnd { agent: String },
    /// A collaborator failed; `agent` is set for agent-scoped failures and
    /// absent for session-fatal ones
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
        error: String,
    },
}

impl SessionEvent {
    pub fn plan(plan: Plan) -> Self {
        SessionEvent::Plan { plan }
    }

    pub fn agent_start(task: &crate::plan::AgentTask) -> Self {
        SessionEvent::AgentStart {
            agent: task.task.clone(),
            task: task.task.clone(),
            prompt: task.prompt.clone(),
        }
    }

    pub fn response(agent: &str, data: impl Into<String>) -> Self {
        SessionEvent::Response {
            agent: agent.to_string(),
            data: data.into(),
        }
    }

    pub fn agent_end(agent: &str) -> Self {
        SessionEvent::AgentEnd {
            agent: agent.to_string(),
        }
    }

    pub fn agent_error(agent: &str, error: impl std::fmt::Display) -> Self {
        SessionEvent::Error {
            agent: Some(agent.to_string()),
            error: error.to_string(),
        }
    }

    pub fn session_error(error: impl std::fmt::Display) -> Self {
        SessionEvent::Error {
            agent: None,
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::AgentTask;

    #[test]
    fn test_plan_event_wire_shape() {
        let event = SessionEvent::plan(Plan {
            response: "ok".to_string(),
            agents: vec![AgentTask {
                task: "bio".to_string(),
                prompt: "Find facts".to_string(),
            }],
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "plan");
        assert_eq!(json["plan"]["agents"][0]["task"], "bio");
    }

    #[test]
    fn test_agent_start_wire_shape() {
        let task = AgentTask {
            task: "bio".to_string(),
            prompt: "Find facts".to_string(),
        };
        let json = serde_json::to_value(SessionEvent::agent_start(&task)).unwrap();
        assert_eq!(json["type"], "agentStart");
        assert_eq!(json["agent"], "bio");
        assert_eq!(json["prompt"], "Find facts");
    }

    #[test]
    fn test_response_uses_camel_case_tag() {
        let json = serde_json::to_value(SessionEvent::response("bio", "chunk")).unwrap();
        assert_eq!(json["type"], "response");
        assert_eq!(json["data"], "chunk");
    }

    #[test]
    fn test_agent_end_wire_shape() {
        let json = serde_json::to_value(SessionEvent::agent_end("bio")).unwrap();
        assert_eq!(json["type"], "agentEnd");
    }

    #[test]
    fn test_session_error_omits_agent_field() {
        let json = serde_json::to_string(&SessionEvent::session_error("planner down")).unwrap();
        assert!(!json.contains("\"agent\""));
        assert!(json.contains("planner down"));
    }

    #[test]
    fn test_agent_error_keeps_agent_field() {
        let json = serde_json::to_value(SessionEvent::agent_error("bio", "timed out")).unwrap();
        assert_eq!(json["agent"], "bio");
        assert_eq!(json["error"], "timed out");
    }
}

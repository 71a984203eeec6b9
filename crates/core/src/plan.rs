//! # Plan Types
//!
//! The structured plan produced once per session by the planning
//! collaborator, plus the defensive parsing that turns raw LLM text into a
//! validated [`Plan`]. The plan is untyped at its source, so any shape
//! mismatch is a session-fatal error - parse, don't assume.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// One planned sub-task. Order in the plan's sequence defines execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    /// Short identifier/label for the agent
    pub task: String,
    /// Instructions for this agent
    pub prompt: String,
}

/// The plan for one session. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Brief description of the plan, shown to the client
    pub response: String,
    /// Ordered sequence of sub-tasks
    pub agents: Vec<AgentTask>,
}

/// Parse the raw text of a planning response into a validated [`Plan`].
///
/// LLMs frequently wrap JSON in markdown code fences; those are stripped
/// before deserializing.
pub fn parse_plan_response(content: &str, max_agents: usize) -> Result<Plan, PlanError> {
    let json_str = extract_json(content);
    let plan: Plan =
        serde_json::from_str(json_str.trim()).map_err(|e| PlanError::Malformed(e.to_string()))?;
    validate_plan(&plan, max_agents)?;
    Ok(plan)
}

/// Enforce the plan-shape policy: a bounded number of agents, each with a
/// non-empty task label. A zero-agent plan is valid (the session emits the
/// plan and closes normally).
pub fn validate_plan(plan: &Plan, max_agents: usize) -> Result<(), PlanError> {
    if plan.agents.len() > max_agents {
        return Err(PlanError::TooManyAgents {
            count: plan.agents.len(),
            max: max_agents,
        });
    }
    if plan.agents.iter().any(|a| a.task.trim().is_empty()) {
        return Err(PlanError::UnlabeledAgent);
    }
    Ok(())
}

/// Pull the JSON payload out of optional markdown code fences.
fn extract_json(content: &str) -> &str {
    if let Some(rest) = content.split("```json").nth(1) {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some(rest) = content.split("```").nth(1) {
        rest.split("```").next().unwrap_or(rest)
    } else {
        content
    }
}

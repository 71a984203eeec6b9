//! # Session Orchestration
//!
//! One session per query: the orchestrator obtains a plan, drives one agent
//! at a time, accumulates knowledge between them, and produces a single
//! ordered stream of lifecycle events for the transport layer.
//!
//! ## Session Flow
//!
//! ```text
//! query -> Planner -> Plan { response, agents[] }
//!       -> for each agent, in order:
//!            AgentStart -> Response* -> AgentEnd (or agent-scoped Error)
//!            successful output appended to the KnowledgeStore
//!       -> stream closes
//! ```

pub mod agent;
pub mod events;
pub mod orchestrator;
pub mod prompts;

pub use agent::AgentRunner;
pub use events::SessionEvent;
pub use orchestrator::Orchestrator;

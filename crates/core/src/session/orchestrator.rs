//! # Orchestrator
//!
//! The session state machine: `Planning -> Executing -> Done`, with
//! `Failed` reachable from either state. One session runs as one spawned
//! task producing events into a bounded channel; the transport pulls them
//! one at a time, so the orchestrator can never race ahead of what the
//! client has been sent. A dropped receiver (client disconnect) is observed
//! at the next send, or immediately while awaiting a collaborator, and
//! terminates the session without further events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::completion::{CompletionKind, CompletionProvider, MoonshotProvider, OpenRouterProvider};
use crate::config::AppConfig;
use crate::error::{AgentError, PlanError};
use crate::knowledge::{KnowledgeEntry, KnowledgeStore};
use crate::plan::validate_plan;
use crate::planner::{planner_for, Planner};

use super::agent::AgentRunner;
use super::events::SessionEvent;

/// Bounded event channel capacity. Small on purpose: the orchestrator
/// suspends once the transport stops flushing.
const EVENT_BUFFER: usize = 16;

/// Drives one session per [`Orchestrator::run`] call. Cheap to clone;
/// collaborators are shared, sessions are not.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<AppConfig>,
    planner: Arc<dyn Planner>,
    completion: Arc<dyn CompletionProvider>,
}

impl Orchestrator {
    pub fn new(
        config: Arc<AppConfig>,
        planner: Arc<dyn Planner>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            config,
            planner,
            completion,
        }
    }

    /// Build an orchestrator with the real collaborators named by the
    /// configuration, sharing one pooled HTTP client.
    pub fn from_config(config: Arc<AppConfig>, client: reqwest::Client) -> Self {
        let planner = planner_for(config.plan_provider, &config, client.clone());
        let completion: Arc<dyn CompletionProvider> = match config.completion_provider {
            CompletionKind::OpenRouter => Arc::new(OpenRouterProvider::new(&config, client)),
            CompletionKind::Moonshot => Arc::new(MoonshotProvider::new(&config, client)),
        };
        Self::new(config, planner, completion)
    }

    /// Start one session. The returned stream is the session's complete,
    /// ordered event sequence; it ends when the session reaches a terminal
    /// state. Dropping the stream cancels the session.
    pub fn run(&self, query: String) -> ReceiverStream<SessionEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let this = self.clone();
        tokio::spawn(async move {
            this.drive(query, tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// The session state machine. Returning ends the stream (the sender
    /// drops, the receiver sees end-of-sequence).
    #[tracing::instrument(skip(self, tx), fields(query_preview = %query.chars().take(50).collect::<String>()))]
    pub(crate) async fn drive(&self, query: String, tx: mpsc::Sender<SessionEvent>) {
        // Planning. Racing against tx.closed() drops the planner call as
        // soon as the client goes away.
        let planning = timeout(self.config.plan_timeout, self.planner.generate_plan(&query));
        let result = tokio::select! {
            _ = tx.closed() => return,
            result = planning => result.map_err(|_| PlanError::Timeout).and_then(|r| r),
        };
        let plan = match result {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "planning failed, session fatal");
                let _ = tx.send(SessionEvent::session_error(e)).await;
                return;
            }
        };

        // The planner is a collaborator; re-check the shape policy here
        // rather than trusting it.
        if let Err(e) = validate_plan(&plan, self.config.max_plan_agents) {
            warn!(error = %e, "plan rejected, session fatal");
            let _ = tx.send(SessionEvent::session_error(e)).await;
            return;
        }

        info!(agents = plan.agents.len(), "plan generated");
        let agents = plan.agents.clone();
        if tx.send(SessionEvent::plan(plan)).await.is_err() {
            return;
        }

        // Executing: one agent at a time, each seeing everything earlier
        // agents discovered.
        let mut knowledge = KnowledgeStore::new();
        let runner = AgentRunner::new(self.completion.as_ref(), &self.config);

        for task in &agents {
            if tx.send(SessionEvent::agent_start(task)).await.is_err() {
                return;
            }

            let snapshot = knowledge.snapshot();
            match runner.run(task, &snapshot, &tx).await {
                Ok(output) => {
                    knowledge.append(KnowledgeEntry::new(&task.task, output));
                    if tx.send(SessionEvent::agent_end(&task.task)).await.is_err() {
                        return;
                    }
                }
                Err(AgentError::Disconnected) => return,
                Err(e) => {
                    // Agent-scoped: skip this agent, continue the plan.
                    warn!(agent = %task.task, error = %e, "agent failed, continuing");
                    if tx
                        .send(SessionEvent::agent_error(&task.task, e))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }

        debug!(entries = knowledge.len(), "session complete");
    }
}

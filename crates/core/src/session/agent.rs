//! # Agent Runner
//!
//! Executes a single planned agent: builds its prompt from the task plus a
//! knowledge snapshot, opens the completion stream, and forwards every
//! chunk immediately as a `Response` event. On clean exhaustion the
//! concatenation of all chunks is the agent's final result; on any failure
//! (including mid-stream) no partial result is returned for merging.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

use crate::completion::CompletionProvider;
use crate::config::AppConfig;
use crate::error::AgentError;
use crate::knowledge::KnowledgeSnapshot;
use crate::plan::AgentTask;

use super::events::SessionEvent;
use super::prompts::build_agent_system_prompt;

/// Runs one agent against the completion collaborator.
pub struct AgentRunner<'a> {
    completion: &'a dyn CompletionProvider,
    connect_timeout: Duration,
    idle_timeout: Duration,
}

impl<'a> AgentRunner<'a> {
    pub fn new(completion: &'a dyn CompletionProvider, config: &AppConfig) -> Self {
        Self {
            completion,
            connect_timeout: config.completion_connect_timeout,
            idle_timeout: config.chunk_idle_timeout,
        }
    }

    /// Run the agent, forwarding each chunk through `tx` as it arrives.
    ///
    /// Returns the full concatenated output on success. A dropped receiver
    /// (client disconnect) surfaces as [`AgentError::Disconnected`], which
    /// the orchestrator treats as silent session termination. Every await
    /// races against `tx.closed()`, so a disconnect is observed promptly
    /// even while the provider stream is stalled, and the in-flight
    /// provider future is dropped with the select arm.
    pub async fn run(
        &self,
        task: &AgentTask,
        knowledge: &KnowledgeSnapshot,
        tx: &mpsc::Sender<SessionEvent>,
    ) -> Result<String, AgentError> {
        let system = build_agent_system_prompt(knowledge);

        debug!(agent = %task.task, provider = self.completion.name(), "starting agent");

        let open = timeout(
            self.connect_timeout,
            self.completion.stream_completion(&system, &task.prompt),
        );
        let mut chunks = tokio::select! {
            _ = tx.closed() => return Err(AgentError::Disconnected),
            result = open => result.map_err(|_| AgentError::Timeout)??,
        };

        let mut output = String::new();
        loop {
            let next = tokio::select! {
                _ = tx.closed() => return Err(AgentError::Disconnected),
                next = timeout(self.idle_timeout, chunks.next()) => next,
            };
            match next {
                Err(_) => return Err(AgentError::Timeout),
                Ok(None) => break,
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(Some(Ok(text))) => {
                    output.push_str(&text);
                    tx.send(SessionEvent::response(&task.task, text))
                        .await
                        .map_err(|_| AgentError::Disconnected)?;
                }
            }
        }

        debug!(agent = %task.task, chars = output.len(), "agent complete");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ChunkStream;
    use crate::error::CompletionError;
    use async_trait::async_trait;
    use futures::stream;

    /// Stub provider yielding a fixed chunk sequence.
    struct StubCompletion {
        chunks: Vec<Result<String, String>>,
    }

    #[async_trait]
    impl CompletionProvider for StubCompletion {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn stream_completion(
            &self,
            _system: &str,
            _prompt: &str,
        ) -> Result<ChunkStream, CompletionError> {
            let items: Vec<Result<String, CompletionError>> = self
                .chunks
                .clone()
                .into_iter()
                .map(|c| c.map_err(CompletionError::Stream))
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    /// Stub provider whose stream never yields a chunk.
    struct StalledCompletion;

    #[async_trait]
    impl CompletionProvider for StalledCompletion {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn stream_completion(
            &self,
            _system: &str,
            _prompt: &str,
        ) -> Result<ChunkStream, CompletionError> {
            let chunks: ChunkStream = Box::pin(stream::pending());
            Ok(chunks)
        }
    }

    fn task() -> AgentTask {
        AgentTask {
            task: "bio".to_string(),
            prompt: "Find biographical facts".to_string(),
        }
    }

    #[tokio::test]
    async fn test_chunks_forwarded_and_concatenated() {
        let provider = StubCompletion {
            chunks: vec![Ok("Alan ".to_string()), Ok("Turing".to_string())],
        };
        let config = AppConfig::default();
        let runner = AgentRunner::new(&provider, &config);
        let (tx, mut rx) = mpsc::channel(8);

        let snapshot: KnowledgeSnapshot = Vec::new().into();
        let output = runner.run(&task(), &snapshot, &tx).await.unwrap();
        assert_eq!(output, "Alan Turing");

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::response("bio", "Alan "));
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::response("bio", "Turing"));
    }

    #[tokio::test]
    async fn test_mid_stream_failure_discards_partial_output() {
        let provider = StubCompletion {
            chunks: vec![
                Ok("partial".to_string()),
                Err("connection reset".to_string()),
            ],
        };
        let config = AppConfig::default();
        let runner = AgentRunner::new(&provider, &config);
        let (tx, mut rx) = mpsc::channel(8);

        let snapshot: KnowledgeSnapshot = Vec::new().into();
        let err = runner.run(&task(), &snapshot, &tx).await.unwrap_err();
        assert!(matches!(err, AgentError::Completion(_)));

        // The chunk seen before the failure was still forwarded live.
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::response("bio", "partial")
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_disconnect() {
        let provider = StubCompletion {
            chunks: vec![Ok("chunk".to_string())],
        };
        let config = AppConfig::default();
        let runner = AgentRunner::new(&provider, &config);
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let snapshot: KnowledgeSnapshot = Vec::new().into();
        let err = runner.run(&task(), &snapshot, &tx).await.unwrap_err();
        assert!(matches!(err, AgentError::Disconnected));
    }

    #[tokio::test]
    async fn test_disconnect_observed_while_stream_stalled() {
        let provider = StalledCompletion;
        // The 60s default idle timeout must play no part in stopping.
        let config = AppConfig::default();
        let runner = AgentRunner::new(&provider, &config);
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let snapshot: KnowledgeSnapshot = Vec::new().into();
        let err = timeout(Duration::from_secs(5), runner.run(&task(), &snapshot, &tx))
            .await
            .expect("agent did not stop after disconnect")
            .unwrap_err();
        assert!(matches!(err, AgentError::Disconnected));
    }
}

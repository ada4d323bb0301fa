//! Conversation orchestrator
//!
//! Per request: load the session history, rebuild the engine-native context,
//! run the reasoning loop (the engine decides which capability functions to
//! call and in what order), extract the updated turn sequence, persist it,
//! and respond. Any failure after history load collapses to one fixed
//! fallback message; the detail stays in logs and metrics.

pub mod instructions;

pub use instructions::system_instruction;

use crate::config::OrchestratorConfig;
use crate::error::{classify, FraudsightError, Result};
use crate::providers::{Message, Provider, ToolCall};
use crate::session::{retain_non_empty, SessionStore, Turn};
use crate::tools::{ToolRegistry, ToolResult};
use anyhow::Context;
use metrics::increment_counter;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Fixed user-facing message for any failure during the reasoning phase
pub const FALLBACK_MESSAGE: &str = "Terdapat kesalahan pada AI, mohon tunggu beberapa saat";

/// Response body when feedback was persisted
pub const FEEDBACK_STORED: &str = "feedback is stored";

/// Response body when no history exists for the session
pub const NO_HISTORY: &str = "There is no historical data";

/// Initializes the metrics exporter for Prometheus
///
/// Only has an effect when compiled with the `prometheus` feature; in other
/// configurations it is a safe no-op.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}

/// Outcome of a feedback submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// Feedback attached to the last turn and persisted
    Stored,
    /// The session has no persisted history; nothing was written
    NoHistory,
}

/// The conversation orchestrator
///
/// Holds the process-wide collaborators (reasoning engine, capability
/// registry, session store), constructed once at startup and injected into
/// the request handlers.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    tools: ToolRegistry,
    sessions: SessionStore,
    system_instruction: String,
    max_tool_iterations: usize,
}

impl Orchestrator {
    /// Creates a new orchestrator
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
        sessions: SessionStore,
        system_instruction: String,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            sessions,
            system_instruction,
            max_tool_iterations: config.max_tool_iterations,
        }
    }

    /// Handle one chat turn, always producing an answer string
    ///
    /// Failures are logged with their full chain and classification, then
    /// collapsed to the fixed fallback message; the HTTP layer always
    /// responds 200.
    pub async fn handle_turn(&self, session_id: &str, user_input: &str) -> String {
        increment_counter!("chat_turns_total");

        match self.run_turn(session_id, user_input).await {
            Ok(answer) => answer,
            Err(err) => {
                let class = classify(&err);
                increment_counter!("fallback_responses_total", "class" => class.as_str());
                error!(
                    session_id,
                    class = class.as_str(),
                    error = ?err,
                    "Chat turn failed, returning fallback"
                );
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    /// One request: load history, run the reasoning loop, persist, answer
    ///
    /// Errors propagate to `handle_turn`, which maps them to the fallback.
    async fn run_turn(&self, session_id: &str, user_input: &str) -> Result<String> {
        // Load prior turns; absence is the valid first-message state
        let prior = self.sessions.load(session_id).await?.unwrap_or_default();
        debug!(session_id, prior_turns = prior.len(), "Loaded session history");

        // Rebuild engine context: role + text only, feedback never re-enters
        let mut messages = Vec::with_capacity(prior.len() + 2);
        messages.push(Message::system(&self.system_instruction));
        for turn in &prior {
            match turn.role.as_str() {
                "user" => messages.push(Message::user(&turn.chat)),
                "assistant" => messages.push(Message::assistant(&turn.chat)),
                other => {
                    tracing::warn!("Skipping stored turn with unknown role: {}", other);
                }
            }
        }
        messages.push(Message::user(user_input));

        let tool_definitions = self.tools.all_definitions();
        let mut iteration = 0;

        let final_text = loop {
            iteration += 1;
            if iteration > self.max_tool_iterations {
                return Err(FraudsightError::MaxIterationsExceeded {
                    limit: self.max_tool_iterations,
                }
                .into());
            }

            let completion = self
                .provider
                .complete(&messages, &tool_definitions)
                .await?;
            let message = completion.message;
            if let Some(usage) = completion.usage {
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Engine usage"
                );
            }

            let tool_calls = message.tool_calls.clone();
            let content = message.content.clone();
            messages.push(message);

            if let Some(calls) = tool_calls {
                if calls.is_empty() {
                    // Engine signalled completion with an empty call list
                    break content.unwrap_or_default();
                }

                debug!("Executing {} tool calls", calls.len());
                for call in &calls {
                    let result = self.execute_tool_call(call).await?;
                    messages.push(Message::tool_result(&call.id, result.to_message()));
                }
                continue;
            }

            match content {
                Some(text) => break text,
                None => {
                    return Err(FraudsightError::Engine(
                        "Engine returned neither content nor tool calls".to_string(),
                    )
                    .into());
                }
            }
        };

        // Extract the updated turn sequence: user/assistant text only,
        // empty turns dropped, order preserved
        let turns: Vec<Turn> = messages
            .iter()
            .filter(|m| m.role == "user" || m.role == "assistant")
            .map(|m| Turn {
                role: m.role.clone(),
                chat: m.content.clone().unwrap_or_default(),
                feedback_good_or_not: None,
                feedback_text: None,
            })
            .collect();
        let turns = retain_non_empty(turns);

        self.sessions.save(session_id, turns).await?;
        info!(session_id, iterations = iteration, "Chat turn completed");

        Ok(final_text)
    }

    /// Executes a single tool call requested by the engine
    ///
    /// The engine's choice of tool and arguments is untrusted: unknown names
    /// and unparseable argument payloads are errors.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        let tool_name = &tool_call.function.name;
        increment_counter!("tool_calls_total", "tool" => tool_name.clone());
        debug!("Executing tool: {}", tool_name);

        let executor = self
            .tools
            .get(tool_name)
            .ok_or_else(|| FraudsightError::Tool(format!("Tool not found: {}", tool_name)))?;

        let args: serde_json::Value =
            serde_json::from_str(&tool_call.function.arguments).map_err(|e| {
                FraudsightError::Tool(format!(
                    "Failed to parse tool arguments for '{}': {}",
                    tool_name, e
                ))
            })?;

        // Context instead of a new error so the original chain stays
        // classifiable at the fallback boundary
        executor
            .execute(args)
            .await
            .with_context(|| format!("Tool '{}' execution failed", tool_name))
    }

    /// Record feedback on the most recent turn of a session
    ///
    /// Absent history is a valid terminal outcome, not an error, and writes
    /// nothing. The last turn is mutated in place regardless of its role;
    /// repeated calls overwrite prior feedback.
    pub async fn record_feedback(
        &self,
        session_id: &str,
        good_or_not: u8,
        text: &str,
    ) -> Result<FeedbackOutcome> {
        let Some(mut turns) = self.sessions.load(session_id).await? else {
            return Ok(FeedbackOutcome::NoHistory);
        };

        match turns.last_mut() {
            Some(last) => {
                last.feedback_good_or_not = Some(good_or_not);
                last.feedback_text = Some(text.to_string());
            }
            None => return Ok(FeedbackOutcome::NoHistory),
        }

        self.sessions.save(session_id, turns).await?;
        increment_counter!("feedback_submissions_total");
        info!(session_id, "Feedback stored");

        Ok(FeedbackOutcome::Stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionResponse, FunctionCall, Message};
    use crate::session::{FsBlobStore, SessionStore};
    use crate::tools::{ToolExecutor, ToolRegistry};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider replaying canned responses
    struct MockProvider {
        responses: Mutex<Vec<Message>>,
        fail: bool,
    }

    impl MockProvider {
        fn new(responses: Vec<Message>) -> Self {
            Self {
                responses: Mutex::new(responses),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                responses: Mutex::new(vec![]),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[serde_json::Value],
        ) -> Result<CompletionResponse> {
            if self.fail {
                return Err(FraudsightError::Engine("engine unavailable".to_string()).into());
            }
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(CompletionResponse::new(Message::assistant("Done")))
            } else {
                Ok(CompletionResponse::new(responses.remove(0)))
            }
        }
    }

    /// Minimal tool answering with a fixed payload
    struct StaticTool {
        payload: &'static str,
    }

    #[async_trait]
    impl ToolExecutor for StaticTool {
        fn tool_definition(&self) -> serde_json::Value {
            serde_json::json!({
                "name": "static_tool",
                "description": "Fixed payload",
                "parameters": {"type": "object", "properties": {}}
            })
        }

        async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult> {
            Ok(ToolResult::success(self.payload.to_string()))
        }
    }

    fn orchestrator_with(
        provider: MockProvider,
        dir: &tempfile::TempDir,
    ) -> Orchestrator {
        let mut tools = ToolRegistry::new();
        tools.register("static_tool", Arc::new(StaticTool { payload: "[]" }));

        let sessions = SessionStore::new(
            Box::new(FsBlobStore::new_with_root(dir.path())),
            "gen-ai-memory/chat_history",
        );

        Orchestrator::new(
            Arc::new(provider),
            tools,
            sessions,
            "test instruction".to_string(),
            &OrchestratorConfig::default(),
        )
    }

    fn session_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(
            Box::new(FsBlobStore::new_with_root(dir.path())),
            "gen-ai-memory/chat_history",
        )
    }

    fn tool_call(name: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: "{}".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_direct_answer_persists_turns() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(vec![Message::assistant("The total is 42")]);
        let orchestrator = orchestrator_with(provider, &dir);

        let answer = orchestrator.handle_turn("s1", "How many frauds?").await;

        assert_eq!(answer, "The total is 42");
        let turns = session_store(&dir).load("s1").await.unwrap().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[0].chat, "How many frauds?");
        assert_eq!(turns[1].role, "assistant");
        assert_eq!(turns[1].chat, "The total is 42");
    }

    #[tokio::test]
    async fn test_tool_call_loop_reaches_final_answer() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(vec![
            Message::assistant_with_tools(vec![tool_call("static_tool")]),
            Message::assistant("No rows matched"),
        ]);
        let orchestrator = orchestrator_with(provider, &dir);

        let answer = orchestrator.handle_turn("s1", "query something").await;

        assert_eq!(answer, "No rows matched");
        // Tool traffic is filtered out of the persisted history
        let turns = session_store(&dir).load("s1").await.unwrap().unwrap();
        assert_eq!(turns.len(), 2);
        assert!(turns.iter().all(|t| t.role == "user" || t.role == "assistant"));
    }

    #[tokio::test]
    async fn test_prior_history_rebuilt_into_context() {
        let dir = tempfile::tempdir().unwrap();
        let store = session_store(&dir);
        store
            .save(
                "s1",
                vec![Turn::user("first question"), Turn::assistant("first answer")],
            )
            .await
            .unwrap();

        let provider = MockProvider::new(vec![Message::assistant("follow-up answer")]);
        let orchestrator = orchestrator_with(provider, &dir);

        let answer = orchestrator.handle_turn("s1", "follow-up").await;

        assert_eq!(answer, "follow-up answer");
        let turns = session_store(&dir).load("s1").await.unwrap().unwrap();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].chat, "first question");
        assert_eq!(turns[3].chat, "follow-up answer");
    }

    #[tokio::test]
    async fn test_engine_failure_returns_fallback_and_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_with(MockProvider::failing(), &dir);

        let answer = orchestrator.handle_turn("s1", "anything").await;

        assert_eq!(answer, FALLBACK_MESSAGE);
        assert!(session_store(&dir).load("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(vec![Message::assistant_with_tools(vec![tool_call(
            "no_such_tool",
        )])]);
        let orchestrator = orchestrator_with(provider, &dir);

        let answer = orchestrator.handle_turn("s1", "anything").await;

        assert_eq!(answer, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_iteration_cap_triggers_fallback() {
        let dir = tempfile::tempdir().unwrap();
        // Every response requests another tool call, never finishing
        let looping: Vec<Message> = (0..20)
            .map(|_| Message::assistant_with_tools(vec![tool_call("static_tool")]))
            .collect();
        let orchestrator = orchestrator_with(MockProvider::new(looping), &dir);

        let answer = orchestrator.handle_turn("s1", "anything").await;

        assert_eq!(answer, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_feedback_attaches_to_last_turn_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = session_store(&dir);
        store
            .save(
                "s1",
                vec![
                    Turn::user("u1"),
                    Turn::assistant("a1"),
                    Turn::user("u2"),
                    Turn::assistant("a2"),
                ],
            )
            .await
            .unwrap();

        let orchestrator = orchestrator_with(MockProvider::new(vec![]), &dir);

        let outcome = orchestrator.record_feedback("s1", 1, "great").await.unwrap();
        assert_eq!(outcome, FeedbackOutcome::Stored);

        let turns = session_store(&dir).load("s1").await.unwrap().unwrap();
        assert_eq!(turns[3].feedback_good_or_not, Some(1));
        assert_eq!(turns[3].feedback_text.as_deref(), Some("great"));
        assert!(turns[1].feedback_good_or_not.is_none());

        // A second submission silently overwrites the previous feedback
        orchestrator.record_feedback("s1", 0, "wrong").await.unwrap();
        let turns = session_store(&dir).load("s1").await.unwrap().unwrap();
        assert_eq!(turns[3].feedback_good_or_not, Some(0));
        assert_eq!(turns[3].feedback_text.as_deref(), Some("wrong"));
        assert!(turns[1].feedback_good_or_not.is_none());
    }

    #[tokio::test]
    async fn test_feedback_without_history_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_with(MockProvider::new(vec![]), &dir);

        let outcome = orchestrator
            .record_feedback("unknown", 0, "n/a")
            .await
            .unwrap();

        assert_eq!(outcome, FeedbackOutcome::NoHistory);
        assert!(session_store(&dir).load("unknown").await.unwrap().is_none());
    }
}

//! Base provider trait and common types for fraudsight
//!
//! This module defines the Provider trait the reasoning-engine client must
//! implement, along with the message types and response structures exchanged
//! with it.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for conversation
///
/// Represents a message in the conversation with the reasoning engine.
/// Messages can be from the user, assistant, system, or tool results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system, tool)
    pub role: String,
    /// Content of the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Optional tool calls in the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Optional tool call ID (for tool result messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use fraudsight::providers::Message;
    ///
    /// let msg = Message::user("Show me last month's fraud totals");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a new tool result message
    ///
    /// # Arguments
    ///
    /// * `tool_call_id` - The ID of the tool call this result corresponds to
    /// * `content` - The tool execution result content
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Creates an assistant message with tool calls
    pub fn assistant_with_tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Whether this message carries any text content
    pub fn has_text(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Function call information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function/tool to call
    pub name: String,
    /// Arguments for the function (as JSON string)
    pub arguments: String,
}

/// Tool call structure
///
/// Represents a request from the reasoning engine to execute a capability
/// function with specific arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Function call details
    pub function: FunctionCall,
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the reasoning engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use fraudsight::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        let total_tokens = prompt_tokens + completion_tokens;
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

/// Completion response with message and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The response message from the engine
    pub message: Message,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse without usage data
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(message: Message, usage: TokenUsage) -> Self {
        Self {
            message,
            usage: Some(usage),
        }
    }
}

/// Provider trait for reasoning engines
///
/// The hosted LLM service is consumed through this trait: the orchestrator
/// hands it the reconstructed conversation plus the capability-function
/// descriptors and receives either a final answer or tool-call requests.
///
/// # Examples
///
/// ```no_run
/// use fraudsight::providers::{Provider, Message, CompletionResponse};
/// use fraudsight::error::Result;
/// use async_trait::async_trait;
///
/// struct MyEngine;
///
/// #[async_trait]
/// impl Provider for MyEngine {
///     async fn complete(
///         &self,
///         messages: &[Message],
///         tools: &[serde_json::Value],
///     ) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new(Message::assistant("Answer")))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation with the given messages and available tools
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation history, oldest first
    /// * `tools` - Capability-function descriptors (as JSON schemas)
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<CompletionResponse>;

    /// Name of the model this provider completes with
    ///
    /// Used for log lines; the default is an opaque placeholder.
    fn model_name(&self) -> String {
        "unknown".to_string()
    }
}

/// Validates message sequence and removes orphan tool messages
///
/// Orphan tool messages are those without a corresponding preceding
/// assistant message with matching tool_calls. Sending them upstream
/// produces API errors, so they are dropped with a warning.
pub fn validate_message_sequence(messages: &[Message]) -> Vec<Message> {
    use std::collections::HashSet;

    let mut valid_tool_ids: HashSet<String> = HashSet::new();
    for message in messages {
        if message.role == "assistant" {
            if let Some(tool_calls) = &message.tool_calls {
                for tool_call in tool_calls {
                    valid_tool_ids.insert(tool_call.id.clone());
                }
            }
        }
    }

    messages
        .iter()
        .filter_map(|message| {
            if message.role == "tool" {
                match &message.tool_call_id {
                    Some(id) if valid_tool_ids.contains(id) => {}
                    Some(id) => {
                        tracing::warn!("Dropping orphan tool message with tool_call_id: {}", id);
                        return None;
                    }
                    None => {
                        tracing::warn!("Dropping tool message without tool_call_id");
                        return None;
                    }
                }
            }
            Some(message.clone())
        })
        .collect()
}

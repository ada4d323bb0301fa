//! Gemini provider implementation for fraudsight
//!
//! This module implements the Provider trait for the hosted Gemini
//! `generateContent` REST surface, including function-calling support.
//! The orchestrator's tool descriptors are forwarded as function
//! declarations and function-call parts are mapped back to tool calls.

use crate::config::EngineConfig;
use crate::error::{FraudsightError, Result};
use crate::providers::{
    validate_message_sequence, CompletionResponse, FunctionCall, Message, Provider, TokenUsage,
    ToolCall,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Default public endpoint; overridden by `engine.api_base` in tests
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Hosted Gemini reasoning engine
///
/// Connects to the `generateContent` endpoint of a Gemini-style API. The
/// `api_base` config field allows pointing the provider at a mock server.
///
/// # Examples
///
/// ```no_run
/// use fraudsight::config::EngineConfig;
/// use fraudsight::providers::{GeminiProvider, Provider, Message};
///
/// # async fn example() -> fraudsight::error::Result<()> {
/// let config = EngineConfig {
///     model: "gemini-2.5-flash".to_string(),
///     api_base: None,
///     api_key: Some("key".to_string()),
/// };
/// let provider = GeminiProvider::new(config)?;
/// let completion = provider.complete(&[Message::user("Hello!")], &[]).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    model: String,
    api_base: String,
    api_key: String,
}

/// Request structure for the generateContent API
#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiToolBlock>,
}

/// One role-tagged content entry with its parts
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// A single content part: text, a function call, or a function response
#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

/// Function-call part emitted by the engine
#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

/// Function-response part sent back after tool execution
#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

/// Tool block wrapping the function declarations
#[derive(Debug, Serialize)]
struct GeminiToolBlock {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

/// Function declaration in the engine's schema format
#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// Response structure from the generateContent API
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: usize,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: usize,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration (model, optional api_base, api key)
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails or no API key is
    /// available (config field or `GEMINI_API_KEY`)
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("fraudsight/0.2.0")
            .build()
            .map_err(|e| FraudsightError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                FraudsightError::Config(
                    "No engine API key: set engine.api_key or GEMINI_API_KEY".to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        tracing::info!(
            "Initialized Gemini provider: model={}, api_base={}",
            config.model,
            api_base
        );

        Ok(Self {
            client,
            model: config.model,
            api_base,
            api_key,
        })
    }

    /// Convert fraudsight messages to engine-native contents
    ///
    /// System messages become the request-level system instruction; tool
    /// results become function-response parts carried under the user role,
    /// with the function name recovered from the originating tool call.
    fn convert_messages(&self, messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let validated = validate_message_sequence(messages);

        let mut call_names: HashMap<String, String> = HashMap::new();
        for message in &validated {
            if let Some(tool_calls) = &message.tool_calls {
                for tc in tool_calls {
                    call_names.insert(tc.id.clone(), tc.function.name.clone());
                }
            }
        }

        let mut system_texts: Vec<String> = Vec::new();
        let mut contents: Vec<GeminiContent> = Vec::new();

        for message in &validated {
            match message.role.as_str() {
                "system" => {
                    if let Some(text) = &message.content {
                        system_texts.push(text.clone());
                    }
                }
                "user" => {
                    contents.push(GeminiContent {
                        role: "user".to_string(),
                        parts: vec![GeminiPart {
                            text: message.content.clone(),
                            ..Default::default()
                        }],
                    });
                }
                "assistant" => {
                    let mut parts = Vec::new();
                    if let Some(text) = &message.content {
                        parts.push(GeminiPart {
                            text: Some(text.clone()),
                            ..Default::default()
                        });
                    }
                    if let Some(tool_calls) = &message.tool_calls {
                        for tc in tool_calls {
                            parts.push(GeminiPart {
                                function_call: Some(GeminiFunctionCall {
                                    name: tc.function.name.clone(),
                                    args: serde_json::from_str(&tc.function.arguments)
                                        .unwrap_or_else(|_| serde_json::json!({})),
                                }),
                                ..Default::default()
                            });
                        }
                    }
                    contents.push(GeminiContent {
                        role: "model".to_string(),
                        parts,
                    });
                }
                "tool" => {
                    let name = message
                        .tool_call_id
                        .as_ref()
                        .and_then(|id| call_names.get(id))
                        .cloned()
                        .unwrap_or_default();
                    let payload = message.content.clone().unwrap_or_default();
                    // The API requires an object; non-object tool output is wrapped
                    let response = match serde_json::from_str::<serde_json::Value>(&payload) {
                        Ok(value @ serde_json::Value::Object(_)) => value,
                        _ => serde_json::json!({ "result": payload }),
                    };
                    contents.push(GeminiContent {
                        role: "user".to_string(),
                        parts: vec![GeminiPart {
                            function_response: Some(GeminiFunctionResponse { name, response }),
                            ..Default::default()
                        }],
                    });
                }
                other => {
                    tracing::warn!("Skipping message with unknown role: {}", other);
                }
            }
        }

        let system_instruction = if system_texts.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: String::new(),
                parts: vec![GeminiPart {
                    text: Some(system_texts.join("\n\n")),
                    ..Default::default()
                }],
            })
        };

        (system_instruction, contents)
    }

    /// Convert tool descriptors to function declarations
    fn convert_tools(&self, tools: &[serde_json::Value]) -> Vec<GeminiToolBlock> {
        let declarations: Vec<GeminiFunctionDeclaration> = tools
            .iter()
            .filter_map(|t| {
                let obj = t.as_object()?;
                let name = obj.get("name")?.as_str()?.to_string();
                let description = obj.get("description")?.as_str()?.to_string();
                let parameters = obj.get("parameters")?.clone();

                Some(GeminiFunctionDeclaration {
                    name,
                    description,
                    parameters,
                })
            })
            .collect();

        if declarations.is_empty() {
            Vec::new()
        } else {
            vec![GeminiToolBlock {
                function_declarations: declarations,
            }]
        }
    }

    /// Convert the first response candidate back to a fraudsight message
    fn convert_response(&self, response: GeminiResponse) -> Result<Message> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            FraudsightError::Engine("Engine returned no candidates".to_string())
        })?;

        let content = candidate.content.ok_or_else(|| {
            FraudsightError::Engine("Engine candidate carried no content".to_string())
        })?;

        let mut texts: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();

        for part in content.parts {
            if let Some(text) = part.text {
                texts.push(text);
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(ToolCall {
                    id: format!("call_{}", Uuid::new_v4().simple()),
                    function: FunctionCall {
                        name: fc.name,
                        arguments: serde_json::to_string(&fc.args)
                            .unwrap_or_else(|_| "{}".to_string()),
                    },
                });
            }
        }

        let text = if texts.is_empty() {
            None
        } else {
            Some(texts.join(""))
        };

        Ok(Message {
            role: "assistant".to_string(),
            content: text,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<CompletionResponse> {
        let (system_instruction, contents) = self.convert_messages(messages);

        let request = GeminiRequest {
            system_instruction,
            contents,
            tools: self.convert_tools(tools),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        tracing::debug!("Sending completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FraudsightError::Engine(format!("Engine request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Engine returned error {}: {}", status, error_text);
            return Err(FraudsightError::Engine(format!(
                "Engine returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse engine response: {}", e);
            FraudsightError::Engine(format!("Failed to parse engine response: {}", e))
        })?;

        let usage = gemini_response.usage_metadata.as_ref().map(|u| {
            TokenUsage::new(u.prompt_token_count, u.candidates_token_count)
        });

        let message = self.convert_response(gemini_response)?;

        Ok(match usage {
            Some(usage) => CompletionResponse::with_usage(message, usage),
            None => CompletionResponse::new(message),
        })
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> GeminiProvider {
        GeminiProvider::new(EngineConfig {
            model: "gemini-2.5-flash".to_string(),
            api_base: Some("http://localhost:0".to_string()),
            api_key: Some("test-key".to_string()),
        })
        .unwrap()
    }

    #[test]
    fn test_convert_messages_splits_system_instruction() {
        let provider = test_provider();
        let messages = vec![
            Message::system("You are an analytics assistant"),
            Message::user("How many frauds last week?"),
        ];

        let (system, contents) = provider.convert_messages(&messages);

        assert!(system.is_some());
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }

    #[test]
    fn test_convert_messages_maps_assistant_to_model_role() {
        let provider = test_provider();
        let messages = vec![Message::assistant("An answer")];

        let (_, contents) = provider.convert_messages(&messages);

        assert_eq!(contents[0].role, "model");
        assert_eq!(contents[0].parts[0].text.as_deref(), Some("An answer"));
    }

    #[test]
    fn test_convert_messages_resolves_function_response_name() {
        let provider = test_provider();
        let call = ToolCall {
            id: "call_7".to_string(),
            function: FunctionCall {
                name: "retrieving_data_db".to_string(),
                arguments: r#"{"query_syntax":"SELECT 1"}"#.to_string(),
            },
        };
        let messages = vec![
            Message::user("total fraud amount?"),
            Message::assistant_with_tools(vec![call]),
            Message::tool_result("call_7", r#"[{"total": 12.5}]"#),
        ];

        let (_, contents) = provider.convert_messages(&messages);

        let response_part = &contents[2].parts[0];
        let fr = response_part.function_response.as_ref().unwrap();
        assert_eq!(fr.name, "retrieving_data_db");
        // Non-object JSON payloads are wrapped into an object
        assert!(fr.response.is_object());
    }

    #[test]
    fn test_convert_tools_builds_declarations() {
        let provider = test_provider();
        let tools = vec![serde_json::json!({
            "name": "retrieving_rag_info",
            "description": "Summaries of reference documents",
            "parameters": {"type": "object", "properties": {}}
        })];

        let blocks = provider.convert_tools(&tools);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].function_declarations.len(), 1);
        assert_eq!(blocks[0].function_declarations[0].name, "retrieving_rag_info");
    }

    #[test]
    fn test_convert_tools_empty() {
        let provider = test_provider();
        assert!(provider.convert_tools(&[]).is_empty());
    }

    #[test]
    fn test_convert_response_text() {
        let provider = test_provider();
        let response = GeminiResponse {
            candidates: vec![GeminiCandidate {
                content: Some(GeminiContent {
                    role: "model".to_string(),
                    parts: vec![GeminiPart {
                        text: Some("Done".to_string()),
                        ..Default::default()
                    }],
                }),
            }],
            usage_metadata: None,
        };

        let message = provider.convert_response(response).unwrap();
        assert_eq!(message.role, "assistant");
        assert_eq!(message.content.as_deref(), Some("Done"));
        assert!(message.tool_calls.is_none());
    }

    #[test]
    fn test_convert_response_function_call() {
        let provider = test_provider();
        let response = GeminiResponse {
            candidates: vec![GeminiCandidate {
                content: Some(GeminiContent {
                    role: "model".to_string(),
                    parts: vec![GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: "retrieving_table_information".to_string(),
                            args: serde_json::json!({}),
                        }),
                        ..Default::default()
                    }],
                }),
            }],
            usage_metadata: None,
        };

        let message = provider.convert_response(response).unwrap();
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "retrieving_table_information");
        assert!(calls[0].id.starts_with("call_"));
    }

    #[test]
    fn test_convert_response_no_candidates_is_error() {
        let provider = test_provider();
        let response = GeminiResponse {
            candidates: vec![],
            usage_metadata: None,
        };
        assert!(provider.convert_response(response).is_err());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        // Force the no-key path regardless of the test environment
        let prior = std::env::var("GEMINI_API_KEY").ok();
        std::env::remove_var("GEMINI_API_KEY");
        let result = GeminiProvider::new(EngineConfig {
            model: "gemini-2.5-flash".to_string(),
            api_base: None,
            api_key: None,
        });
        if let Some(value) = prior {
            std::env::set_var("GEMINI_API_KEY", value);
        }
        assert!(result.is_err());
    }
}

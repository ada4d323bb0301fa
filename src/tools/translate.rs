//! translate_output capability
//!
//! A pass-through tool: it performs no translation itself. Its presence
//! forces the reasoning engine to produce an explicit translation step so
//! the final answer matches the user's input language.

use crate::error::Result;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::json;

/// Parameters for the translate_output tool
#[derive(Debug, Deserialize)]
struct TranslateParams {
    /// Target language name (e.g. "Indonesia" or "English")
    #[allow(dead_code)]
    language: String,
    /// The already-translated answer text
    translated_output: String,
}

/// Echo tool for the explicit translation step
pub struct TranslateTool;

impl TranslateTool {
    /// Creates the tool
    pub fn new() -> Self {
        Self
    }
}

impl Default for TranslateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ToolExecutor for TranslateTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "translate_output",
            "description": "Translates the final answer into the language the user communicates in. Call this as the last step, passing the target language and the already-translated answer text.",
            "parameters": {
                "type": "object",
                "properties": {
                    "language": {
                        "type": "string",
                        "description": "Target language, matching the user's input language"
                    },
                    "translated_output": {
                        "type": "string",
                        "description": "The answer text, already translated into the target language"
                    }
                },
                "required": ["language", "translated_output"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: TranslateParams = serde_json::from_value(args)?;
        Ok(ToolResult::success(params.translated_output))
    }
}

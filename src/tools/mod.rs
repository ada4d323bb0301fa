//! Capability functions for fraudsight
//!
//! This module contains the tool abstraction (definition, result, executor
//! trait, registry) and the five capability functions the reasoning engine
//! may invoke: schema lookup, structured query execution, document-summary
//! lookup, semantic passage retrieval, and the explicit translation step.

pub mod query_db;
pub mod query_rag;
pub mod rag_info;
pub mod table_info;
pub mod translate;

pub use query_db::QueryDbTool;
pub use query_rag::QueryRagTool;
pub use rag_info::RagInfoTool;
pub use table_info::TableInfoTool;
pub use translate::TranslateTool;

use crate::config::{OrchestratorConfig, RetrievalConfig, WarehouseConfig};
use crate::error::Result;
use crate::retrieval::PassageIndex;
use crate::warehouse::Warehouse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Tool definition structure
///
/// Represents a capability function the reasoning engine can call.
/// Follows the OpenAI function calling format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Name of the tool
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON schema for the tool's parameters
    pub parameters: serde_json::Value,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: String, description: String, parameters: serde_json::Value) -> Self {
        Self {
            name,
            description,
            parameters,
        }
    }
}

/// Tool result structure
///
/// Represents the result of a capability-function execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Whether the execution succeeded
    pub success: bool,
    /// Output from the tool
    pub output: String,
    /// Error message if execution failed
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    /// Create a failed tool result
    pub fn error(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
        }
    }

    /// Convert to a message string for the conversation
    pub fn to_message(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!(
                "Error: {}",
                self.error.as_ref().unwrap_or(&"Unknown error".to_string())
            )
        }
    }
}

/// Tool executor trait for implementing capability functions
///
/// Each capability must provide its engine-facing definition and execution
/// logic. Backend failures (warehouse, vector index) propagate as errors;
/// the orchestrator, not the tool, maps them to the fallback response.
///
/// # Examples
///
/// ```no_run
/// use fraudsight::tools::{ToolExecutor, ToolResult};
/// use fraudsight::error::Result;
/// use async_trait::async_trait;
/// use serde_json::Value;
///
/// struct MyTool;
///
/// #[async_trait]
/// impl ToolExecutor for MyTool {
///     fn tool_definition(&self) -> Value {
///         serde_json::json!({
///             "name": "my_tool",
///             "description": "Does something useful",
///             "parameters": {"type": "object", "properties": {}}
///         })
///     }
///
///     async fn execute(&self, _args: Value) -> Result<ToolResult> {
///         Ok(ToolResult::success("done".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Returns the tool definition as a JSON value
    fn tool_definition(&self) -> serde_json::Value;

    /// Executes the tool with the given arguments
    ///
    /// # Errors
    ///
    /// Returns error if validation rejects the arguments or the backend fails
    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult>;
}

/// Tool registry for the capability functions
///
/// The registry maintains the closed set of tools the reasoning engine may
/// dispatch to during a conversation turn.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool executor in the registry
    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn ToolExecutor>) {
        self.tools.insert(name.into(), executor);
    }

    /// Get a tool executor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).cloned()
    }

    /// Get all tool definitions as JSON values
    pub fn all_definitions(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .map(|executor| executor.tool_definition())
            .collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the capability-function registry
///
/// Registers the four core capabilities and, when
/// `enable_explicit_translation_step` is set, the pass-through translation
/// tool that nudges the engine into an explicit final-language step.
pub fn build_registry(
    warehouse: Arc<dyn Warehouse>,
    index: Arc<dyn PassageIndex>,
    warehouse_config: &WarehouseConfig,
    retrieval_config: &RetrievalConfig,
    orchestrator_config: &OrchestratorConfig,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(
        "retrieving_table_information",
        Arc::new(TableInfoTool::new(warehouse_config.table.clone())),
    );
    registry.register(
        "retrieving_data_db",
        Arc::new(QueryDbTool::new(warehouse)),
    );
    registry.register("retrieving_rag_info", Arc::new(RagInfoTool::new()));
    registry.register(
        "retrieving_data_rag",
        Arc::new(QueryRagTool::new(index, retrieval_config.max_passages)),
    );

    if orchestrator_config.enable_explicit_translation_step {
        registry.register("translate_output", Arc::new(TranslateTool::new()));
    }

    registry
}

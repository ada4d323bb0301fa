//! retrieving_data_db capability
//!
//! Executes a reasoning-engine-supplied SQL query against the transaction
//! warehouse and returns the result rows as JSON text. The query string is
//! untrusted input: it must be a single read-only statement.

use crate::error::{FraudsightError, Result};
use crate::tools::{ToolExecutor, ToolResult};
use crate::warehouse::{rows_to_json, Warehouse};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Parameters for the retrieving_data_db tool
#[derive(Debug, Deserialize)]
struct QueryDbParams {
    /// Complete SQL query in the warehouse dialect
    query_syntax: String,
}

/// Tool executing structured queries against the warehouse
///
/// Temporal columns serialize as ISO-8601 text and an empty result set
/// serializes as `[]`. Warehouse failures propagate to the orchestrator.
pub struct QueryDbTool {
    warehouse: Arc<dyn Warehouse>,
    read_only_guard: Regex,
}

impl QueryDbTool {
    /// Creates the tool over the given warehouse
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            warehouse,
            // Statement must start with SELECT or WITH
            read_only_guard: Regex::new(r"(?is)^\s*(select|with)\b").expect("static regex"),
        }
    }

    /// Rejects empty or non-read-only query strings
    ///
    /// The engine's choice of arguments is an external, non-deterministic
    /// input; this guard refuses anything that is not a single SELECT/WITH
    /// statement before it reaches the warehouse.
    fn validate(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(
                FraudsightError::InvalidToolInput("Empty query string".to_string()).into(),
            );
        }
        if !self.read_only_guard.is_match(query) {
            return Err(FraudsightError::InvalidToolInput(
                "Only read-only SELECT/WITH queries are allowed".to_string(),
            )
            .into());
        }
        // No statement chaining: a semicolon may only appear as a trailer
        if let Some(pos) = query.find(';') {
            if !query[pos + 1..].trim().is_empty() {
                return Err(FraudsightError::InvalidToolInput(
                    "Multiple SQL statements are not allowed".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ToolExecutor for QueryDbTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "retrieving_data_db",
            "description": "Executes a SQL query against the credit-card transaction warehouse and returns the results. Consider the historical chat when composing the query. Returns a JSON list of objects, one per result row; an empty result is the empty list [].",
            "parameters": {
                "type": "object",
                "properties": {
                    "query_syntax": {
                        "type": "string",
                        "description": "A complete, valid SQL query string to execute against the warehouse"
                    }
                },
                "required": ["query_syntax"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: QueryDbParams = serde_json::from_value(args)?;
        self.validate(&params.query_syntax)?;

        tracing::info!("Running warehouse query: {}", params.query_syntax);
        let rows = self.warehouse.query(&params.query_syntax).await?;
        let payload = rows_to_json(&rows)?;

        Ok(ToolResult::success(payload))
    }
}

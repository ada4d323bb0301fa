//! retrieving_data_rag capability
//!
//! Semantic passage retrieval over the reference documents. Returns at most
//! the configured number of passages (4 by default) as JSON; an empty index
//! yields the empty list, never an error.

use crate::error::Result;
use crate::retrieval::PassageIndex;
use crate::tools::{ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Parameters for the retrieving_data_rag tool
#[derive(Debug, Deserialize)]
struct QueryRagParams {
    /// Natural-language question to search the documents with
    question: String,
}

/// Tool retrieving relevant document passages for a question
pub struct QueryRagTool {
    index: Arc<dyn PassageIndex>,
    max_passages: usize,
}

impl QueryRagTool {
    /// Creates the tool over the given passage index with a result cap
    pub fn new(index: Arc<dyn PassageIndex>, max_passages: usize) -> Self {
        Self {
            index,
            max_passages,
        }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for QueryRagTool {
    fn tool_definition(&self) -> serde_json::Value {
        json!({
            "name": "retrieving_data_rag",
            "description": "Searches the reference documents and retrieves the passages most relevant to the given question. Returns a JSON list of objects with page_content, document_name, and document_page.",
            "parameters": {
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question used to search for information inside the documents"
                    }
                },
                "required": ["question"]
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
        let params: QueryRagParams = serde_json::from_value(args)?;

        tracing::info!("Searching passages for: {}", params.question);
        let mut passages = self.index.search(&params.question, self.max_passages).await?;
        // The index is asked for at most max_passages; truncate defensively
        // in case an implementation ignores the cap.
        passages.truncate(self.max_passages);

        Ok(ToolResult::success(serde_json::to_string(&passages)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::Passage;
    use async_trait::async_trait;

    struct FakeIndex {
        passages: Vec<Passage>,
    }

    #[async_trait]
    impl PassageIndex for FakeIndex {
        async fn search(&self, _question: &str, k: usize) -> Result<Vec<Passage>> {
            Ok(self.passages.iter().take(k).cloned().collect())
        }
    }

    /// Index that ignores the k cap, to exercise the defensive truncation
    struct UncappedIndex {
        passages: Vec<Passage>,
    }

    #[async_trait]
    impl PassageIndex for UncappedIndex {
        async fn search(&self, _question: &str, _k: usize) -> Result<Vec<Passage>> {
            Ok(self.passages.clone())
        }
    }

    fn passage(i: i64) -> Passage {
        Passage {
            page_content: format!("passage {}", i),
            document_name: "Understanding Credit Card Frauds".to_string(),
            document_page: i,
        }
    }

    #[tokio::test]
    async fn test_empty_index_yields_empty_list() {
        let tool = QueryRagTool::new(Arc::new(FakeIndex { passages: vec![] }), 4);
        let result = tool
            .execute(json!({"question": "what is skimming?"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "[]");
    }

    #[tokio::test]
    async fn test_never_returns_more_than_cap() {
        let passages = (0..10).map(passage).collect();
        let tool = QueryRagTool::new(Arc::new(UncappedIndex { passages }), 4);
        let result = tool
            .execute(json!({"question": "common fraud methods"}))
            .await
            .unwrap();

        let parsed: Vec<Passage> = serde_json::from_str(&result.output).unwrap();
        assert_eq!(parsed.len(), 4);
    }

    #[tokio::test]
    async fn test_fewer_matches_than_cap_pass_through() {
        let passages = (0..2).map(passage).collect();
        let tool = QueryRagTool::new(Arc::new(FakeIndex { passages }), 4);
        let result = tool
            .execute(json!({"question": "chargebacks"}))
            .await
            .unwrap();

        let parsed: Vec<Passage> = serde_json::from_str(&result.output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].document_name, "Understanding Credit Card Frauds");
    }

    #[tokio::test]
    async fn test_missing_question_is_error() {
        let tool = QueryRagTool::new(Arc::new(FakeIndex { passages: vec![] }), 4);
        assert!(tool.execute(json!({})).await.is_err());
    }
}

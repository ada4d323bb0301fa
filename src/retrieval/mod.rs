//! Semantic passage retrieval boundary
//!
//! Conceptual questions are answered from two reference documents whose
//! pages are stored as embedded passages in a pgvector index. This module
//! defines the retrieval traits and the postgres implementation; the
//! embedding math itself stays in the hosted embedding service.

use crate::error::{FraudsightError, Result};
use async_trait::async_trait;
use pgvector::Vector;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::Row as SqlxRow;
use std::time::Duration;

/// A single semantic match from the passage index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// The matched text content
    pub page_content: String,
    /// Source document name
    pub document_name: String,
    /// Source page within the document
    pub document_page: i64,
}

/// Passage index boundary
///
/// Zero matches is a valid result (`Ok(vec![])`), never an error.
#[async_trait]
pub trait PassageIndex: Send + Sync {
    /// Return up to `k` passages ranked by similarity to the question
    async fn search(&self, question: &str, k: usize) -> Result<Vec<Passage>>;
}

/// Embedding boundary
///
/// Maps a text to its embedding vector via an external service.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Hosted embedding endpoint client
///
/// Calls an `embedContent`-style REST endpoint; the `api_base` parameter
/// allows pointing at a mock server in tests.
pub struct HttpEmbedder {
    client: Client,
    model: String,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbedValues,
}

#[derive(Debug, Deserialize)]
struct EmbedValues {
    values: Vec<f32>,
}

impl HttpEmbedder {
    /// Create a new embedding client
    pub fn new(model: String, api_base: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("fraudsight/0.2.0")
            .build()
            .map_err(|e| {
                FraudsightError::Retrieval(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            model,
            api_base,
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1beta/models/{}:embedContent", self.api_base, self.model);

        let request = EmbedRequest {
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FraudsightError::Retrieval(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FraudsightError::Retrieval(format!(
                "Embedding endpoint returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            FraudsightError::Retrieval(format!("Failed to parse embedding response: {}", e))
        })?;

        Ok(parsed.embedding.values)
    }
}

/// pgvector-backed passage index
///
/// Queries the langchain-style embedding tables: passages live in
/// `langchain_pg_embedding` with a jsonb `cmetadata` carrying `doc` and
/// `page`, grouped under a named collection.
pub struct PgVectorIndex {
    pool: PgPool,
    embedder: Box<dyn Embedder>,
    collection: String,
}

impl PgVectorIndex {
    /// Create an index over the given pool and collection name
    pub fn new(pool: PgPool, embedder: Box<dyn Embedder>, collection: String) -> Self {
        Self {
            pool,
            embedder,
            collection,
        }
    }
}

#[async_trait]
impl PassageIndex for PgVectorIndex {
    async fn search(&self, question: &str, k: usize) -> Result<Vec<Passage>> {
        let embedding = self.embedder.embed(question).await?;
        let query_vector = Vector::from(embedding);

        let rows = sqlx::query(
            "SELECT e.document, e.cmetadata \
             FROM langchain_pg_embedding e \
             JOIN langchain_pg_collection c ON e.collection_id = c.uuid \
             WHERE c.name = $1 \
             ORDER BY e.embedding <=> $2 \
             LIMIT $3",
        )
        .bind(&self.collection)
        .bind(query_vector)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FraudsightError::Retrieval(format!("Similarity search failed: {}", e)))?;

        let mut passages = Vec::with_capacity(rows.len());
        for row in rows {
            let document: String = row.try_get("document")?;
            let metadata: serde_json::Value = row.try_get("cmetadata")?;
            passages.push(Passage {
                page_content: document,
                document_name: metadata
                    .get("doc")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                document_page: metadata.get("page").and_then(|v| v.as_i64()).unwrap_or(0),
            });
        }

        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_serialization_shape() {
        let passage = Passage {
            page_content: "The most common type of fraud is the use of a lost or stolen card."
                .to_string(),
            document_name: "Understanding Credit Card Frauds".to_string(),
            document_page: 3,
        };

        let json = serde_json::to_value(&passage).unwrap();
        assert_eq!(
            json["document_name"],
            serde_json::json!("Understanding Credit Card Frauds")
        );
        assert_eq!(json["document_page"], serde_json::json!(3));
        assert!(json["page_content"].as_str().unwrap().contains("stolen card"));
    }

    #[tokio::test]
    async fn test_http_embedder_against_mock_endpoint() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/embed-test:embedContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": { "values": [0.1, 0.2, 0.3] }
            })))
            .mount(&server)
            .await;

        let embedder =
            HttpEmbedder::new("embed-test".to_string(), server.uri(), "key".to_string()).unwrap();
        let values = embedder.embed("what is skimming?").await.unwrap();

        assert_eq!(values, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_http_embedder_propagates_upstream_error() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let embedder =
            HttpEmbedder::new("embed-test".to_string(), server.uri(), "key".to_string()).unwrap();
        assert!(embedder.embed("anything").await.is_err());
    }
}

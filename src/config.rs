//! Configuration management for fraudsight
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI overrides.
//! Everything is resolved once at startup; there is no hot-reload.

use crate::cli::Cli;
use crate::error::{FraudsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for fraudsight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hosting project identifier, used for log context only
    #[serde(default)]
    pub project_id: Option<String>,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reasoning-engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Warehouse settings
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Passage-retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Session-memory settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Secret-provider settings
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Orchestrator behavior settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Reasoning-engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model to complete with
    #[serde(default = "default_engine_model")]
    pub model: String,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used to build the `generateContent` endpoint,
    /// which allows tests to point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// API key; falls back to the GEMINI_API_KEY environment variable
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_engine_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_engine_model(),
            api_base: None,
            api_key: None,
        }
    }
}

/// Warehouse configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Fully-qualified transaction table name used in the schema description
    #[serde(default = "default_warehouse_table")]
    pub table: String,

    /// Database driver name (environment override: DRIVER)
    #[serde(default = "default_warehouse_driver")]
    pub driver: String,
}

fn default_warehouse_table() -> String {
    "fraud_data".to_string()
}

fn default_warehouse_driver() -> String {
    "postgres".to_string()
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            table: default_warehouse_table(),
            driver: default_warehouse_driver(),
        }
    }
}

/// Passage-retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Vector-store collection holding the document passages
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Maximum passages returned per retrieval query
    #[serde(default = "default_max_passages")]
    pub max_passages: usize,

    /// Embedding model used to vectorize retrieval questions
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_collection() -> String {
    "rag_data".to_string()
}

fn default_max_passages() -> usize {
    4
}

fn default_embedding_model() -> String {
    "gemini-embedding-001".to_string()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            max_passages: default_max_passages(),
            embedding_model: default_embedding_model(),
        }
    }
}

/// Session-memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Blob-store root directory (environment override: BUCKET_NAME);
    /// when absent the user data directory is used
    #[serde(default)]
    pub bucket: Option<String>,

    /// Namespace prefix under which history documents are written
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "gen-ai-memory/chat_history".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            namespace: default_namespace(),
        }
    }
}

/// Secret-provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Directory holding secret documents
    #[serde(default = "default_secrets_dir")]
    pub dir: String,

    /// Identifier of the warehouse credential secret
    /// (environment override: SECRET_ID_DB)
    #[serde(default = "default_secret_id")]
    pub secret_id: String,
}

fn default_secrets_dir() -> String {
    "secrets".to_string()
}

fn default_secret_id() -> String {
    "db-credentials".to_string()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            dir: default_secrets_dir(),
            secret_id: default_secret_id(),
        }
    }
}

/// Orchestrator behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum reasoning/tool-call iterations per request
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Whether to register the pass-through translate_output tool and
    /// instruct the engine to take an explicit final translation step
    #[serde(default = "default_translation_step")]
    pub enable_explicit_translation_step: bool,
}

fn default_max_tool_iterations() -> usize {
    8
}

fn default_translation_step() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
            enable_explicit_translation_step: default_translation_step(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file with environment and CLI overrides
    ///
    /// A missing config file is not an error: defaults apply, matching the
    /// environment-variable-driven deployment style.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments whose overrides win over the file
    pub fn load(path: impl AsRef<Path>, cli: &Cli) -> Result<Self> {
        let path = path.as_ref();
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            Config::default()
        };

        config.apply_env_overrides();

        if let Some(host) = &cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        Ok(config)
    }

    /// Apply the environment overrides resolved once at startup
    fn apply_env_overrides(&mut self) {
        if let Ok(project_id) = std::env::var("PROJECT_ID") {
            self.project_id = Some(project_id);
        }
        if let Ok(bucket) = std::env::var("BUCKET_NAME") {
            self.session.bucket = Some(bucket);
        }
        if let Ok(secret_id) = std::env::var("SECRET_ID_DB") {
            self.secrets.secret_id = secret_id;
        }
        if let Ok(driver) = std::env::var("DRIVER") {
            self.warehouse.driver = driver;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `FraudsightError::Config` when a field is unusable
    pub fn validate(&self) -> Result<()> {
        if self.engine.model.is_empty() {
            return Err(FraudsightError::Config("engine.model must not be empty".into()).into());
        }
        if self.warehouse.table.is_empty() {
            return Err(
                FraudsightError::Config("warehouse.table must not be empty".into()).into(),
            );
        }
        if self.retrieval.max_passages == 0 {
            return Err(FraudsightError::Config(
                "retrieval.max_passages must be greater than 0".into(),
            )
            .into());
        }
        if self.session.namespace.is_empty() {
            return Err(
                FraudsightError::Config("session.namespace must not be empty".into()).into(),
            );
        }
        if self.orchestrator.max_tool_iterations == 0 {
            return Err(FraudsightError::Config(
                "orchestrator.max_tool_iterations must be greater than 0".into(),
            )
            .into());
        }
        Ok(())
    }
}

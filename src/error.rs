//! Error types for fraudsight
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for fraudsight operations
///
/// This enum encompasses all possible errors that can occur during
/// request handling: configuration loading, reasoning-engine calls,
/// capability-function execution, warehouse queries, passage retrieval,
/// and session persistence.
#[derive(Error, Debug)]
pub enum FraudsightError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reasoning-engine errors (API calls, malformed responses, etc.)
    #[error("Engine error: {0}")]
    Engine(String),

    /// Capability-function execution errors
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// Warehouse query errors
    #[error("Warehouse error: {0}")]
    Warehouse(String),

    /// A query-result column of a type that cannot be serialized to JSON
    #[error("Column '{column}' of type {type_name} is not JSON serializable")]
    UnsupportedColumnType {
        /// Column name in the result set
        column: String,
        /// Database type name of the offending column
        type_name: String,
    },

    /// Passage-retrieval errors (vector index, embedding endpoint)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Session-history persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Secret-provider errors
    #[error("Secret error: {0}")]
    Secret(String),

    /// Rejected tool input (empty or unsafe query strings, etc.)
    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    /// Orchestrator exceeded the per-request tool-call iteration limit
    #[error("Reasoning loop exceeded maximum iterations: limit={limit}")]
    MaxIterationsExceeded {
        /// The configured iteration limit
        limit: usize,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Database driver errors
    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Coarse failure classification logged at the orchestrator boundary
///
/// Callers always receive one fixed fallback message; this classification
/// preserves the distinction (upstream outage vs. bad configuration vs.
/// rejected input) in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient failure in an external collaborator (engine, warehouse,
    /// vector index, blob store)
    Upstream,
    /// Misconfiguration detected at runtime
    Configuration,
    /// Input rejected by defensive validation
    Validation,
}

impl ErrorClass {
    /// Label used for log fields and metric labels
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upstream => "upstream",
            Self::Configuration => "configuration",
            Self::Validation => "validation",
        }
    }
}

/// Classifies an error chain for logging
///
/// Walks the `anyhow` chain looking for a `FraudsightError`; anything that
/// is not recognizably configuration or validation counts as upstream, which
/// matches the propagation policy: broad, collapsed, but not discarded.
pub fn classify(err: &anyhow::Error) -> ErrorClass {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<FraudsightError>() {
            return match e {
                FraudsightError::Config(_) | FraudsightError::Yaml(_) => ErrorClass::Configuration,
                FraudsightError::InvalidToolInput(_) => ErrorClass::Validation,
                _ => ErrorClass::Upstream,
            };
        }
    }
    ErrorClass::Upstream
}

/// Result type alias for fraudsight operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

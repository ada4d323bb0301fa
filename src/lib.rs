//! Fraudsight - conversational fraud-analytics assistant
//!
//! This library provides the core functionality for the fraudsight chat
//! service: the conversation orchestrator, the capability functions the
//! reasoning engine may invoke, session-scoped conversation memory, and the
//! boundaries to the external collaborators (reasoning engine, warehouse,
//! vector index, secret provider).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `orchestrator`: per-turn state machine, feedback recorder, system instruction
//! - `providers`: reasoning-engine abstraction and the Gemini implementation
//! - `tools`: the five capability functions and the tool registry
//! - `session`: turn model and blob-backed session store
//! - `warehouse`: structured-query boundary with ISO-8601 row serialization
//! - `retrieval`: semantic passage search over the reference documents
//! - `secrets`: one-time credential resolution
//! - `server`: the axum HTTP surface
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use fraudsight::{Cli, Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cli = Cli::default();
//! let config = Config::load("config/config.yaml", &cli)?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod retrieval;
pub mod secrets;
pub mod server;
pub mod session;
pub mod tools;
pub mod warehouse;

// Re-export commonly used types
pub use cli::Cli;
pub use config::Config;
pub use error::{FraudsightError, Result};
pub use orchestrator::Orchestrator;

//! Fraudsight - conversational fraud-analytics assistant
//!
#![doc = "Main entry point for the fraudsight chat service."]

use anyhow::Result;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fraudsight::config::Config;
use fraudsight::error::FraudsightError;
use fraudsight::orchestrator::{self, system_instruction, Orchestrator};
use fraudsight::providers::gemini::DEFAULT_API_BASE;
use fraudsight::providers::GeminiProvider;
use fraudsight::retrieval::{HttpEmbedder, PgVectorIndex};
use fraudsight::secrets::{FileSecretProvider, SecretProvider};
use fraudsight::server::{self, AppState};
use fraudsight::session::{BlobStore, FsBlobStore, SessionStore};
use fraudsight::tools::build_registry;
use fraudsight::warehouse::{build_pool, PgWarehouse};
use fraudsight::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();
    orchestrator::init_metrics_exporter();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load and validate configuration (file + env + CLI overrides)
    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;
    config.validate()?;

    if let Some(project_id) = &config.project_id {
        tracing::info!("Serving for project {}", project_id);
    }

    // Resolve the warehouse secret once at startup
    let secret_provider = FileSecretProvider::new(&config.secrets.dir);
    let credentials = secret_provider.fetch(&config.secrets.secret_id)?;
    tracing::info!(
        "Resolved warehouse credentials for database '{}' (driver: {})",
        credentials.database,
        config.warehouse.driver
    );

    // One shared pool for warehouse queries and the vector index
    let pool = build_pool(&credentials)?;
    let warehouse = Arc::new(PgWarehouse::new(pool.clone()));

    let api_base = config
        .engine
        .api_base
        .clone()
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let api_key = config
        .engine
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .ok_or_else(|| {
            FraudsightError::Config(
                "No engine API key: set engine.api_key or GEMINI_API_KEY".to_string(),
            )
        })?;

    let embedder = HttpEmbedder::new(
        config.retrieval.embedding_model.clone(),
        api_base,
        api_key,
    )?;
    let index = Arc::new(PgVectorIndex::new(
        pool,
        Box::new(embedder),
        config.retrieval.collection.clone(),
    ));

    let registry = build_registry(
        warehouse,
        index,
        &config.warehouse,
        &config.retrieval,
        &config.orchestrator,
    );

    let blobs: Box<dyn BlobStore> = match &config.session.bucket {
        Some(root) => Box::new(FsBlobStore::new_with_root(root)),
        None => Box::new(FsBlobStore::new()?),
    };
    let sessions = SessionStore::new(blobs, config.session.namespace.clone());

    let provider = Arc::new(GeminiProvider::new(config.engine.clone())?);
    tracing::info!("Reasoning engine model: {}", config.engine.model);

    let instruction = system_instruction(
        &config.warehouse.table,
        config.orchestrator.enable_explicit_translation_step,
    );
    let orchestrator = Orchestrator::new(
        provider,
        registry,
        sessions,
        instruction,
        &config.orchestrator,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    server::run(AppState::new(orchestrator), &addr).await
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraudsight=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

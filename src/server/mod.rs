//! HTTP server for fraudsight

pub mod routes;

use crate::error::Result;
use crate::orchestrator::Orchestrator;
use axum::Router;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
///
/// Built once at startup; handlers receive it by reference instead of
/// reaching for ambient globals, so tests can substitute fakes.
pub struct AppState {
    /// The conversation orchestrator with its injected collaborators
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Creates application state around an orchestrator
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Build the application router
///
/// Exposed separately from [`run`] so tests can drive the router directly.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::chatbot_routes())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let state = Arc::new(state);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

//! AgriDetect daemon - plant disease knowledge service
//!
//! Serves the disease catalog, classifier-label reconciliation, detection
//! reports and the chat assistant over HTTP.

use agri_shared::{KnowledgeBase, VERSION};
use agrid::{server, AppState, Config};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("AgriDetect daemon v{} starting", VERSION);

    let config = Config::load();

    // Invalid knowledge is fatal: refuse to serve a broken catalog.
    let kb = match &config.knowledge.path {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("loading knowledge base {}", path.display()))?,
        None => KnowledgeBase::builtin().context("validating built-in knowledge base")?,
    };
    info!(
        "Knowledge base ready: {} diseases, {} treatments",
        kb.diseases().len(),
        kb.treatments().len()
    );
    info!(
        "Default language: {}, sessions: {}",
        config.assistant.default_language,
        if config.sessions.enabled { "on" } else { "off" }
    );

    let state = AppState::new(Arc::new(kb), config);
    info!("No classifier attached; /api/v1/detect-disease answers 503");

    server::run(state).await
}

//! HTTP server for agrid

use crate::classifier::Classifier;
use crate::config::{Config, ServerConfig};
use crate::routes;
use crate::sessions::SessionStore;
use agri_shared::{Catalog, DetectionBuilder, KnowledgeBase, Language, Reconciler, Resolver};
use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub catalog: Catalog,
    pub reconciler: Reconciler,
    pub resolver: Resolver,
    pub detector: DetectionBuilder,
    /// None when session history is disabled
    pub sessions: Option<SessionStore>,
    pub classifier: Option<Arc<dyn Classifier>>,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the core components around one validated knowledge base.
    pub fn new(kb: Arc<KnowledgeBase>, config: Config) -> Self {
        let catalog = Catalog::new(kb.clone());
        let reconciler = Reconciler::new(kb.clone());
        let resolver = Resolver::with_builtin_rules(kb, config.assistant.fold_accents);
        let detector = DetectionBuilder::new(catalog.clone(), reconciler.clone())
            .with_threshold(config.detection.confidence_threshold)
            .with_top_k(config.detection.top_k)
            .with_class_labels(config.detection.class_labels.clone());
        let sessions = config.sessions.enabled.then(SessionStore::new);

        Self {
            catalog,
            reconciler,
            resolver,
            detector,
            sessions,
            classifier: None,
            config,
            start_time: Instant::now(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Request language, else the configured default.
    pub fn language(&self, requested: Option<&str>) -> Language {
        requested
            .and_then(Language::parse)
            .unwrap_or(self.config.assistant.default_language)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if server.allows_any_origin() {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Build the router with all middleware applied.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = state.config.server.max_image_bytes();
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs.max(1));
    let state = Arc::new(state);

    Router::new()
        .merge(routes::info_routes())
        .merge(routes::health_routes())
        .merge(routes::chat_routes())
        .merge(routes::disease_routes())
        .merge(routes::detection_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.server.bind_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}

//! API routes for agrid

use crate::classifier::ClassifierError;
use crate::error::ApiError;
use crate::server::AppState;
use agri_shared::reconcile::fallback_label;
use agri_shared::rpc::{
    ChatRequest, ChatResponse, DiseaseListResponse, HealthResponse, InterpretRequest,
    LiveResponse, ReconcileRequest, ReconcileResponse, ServiceInfo, SessionTranscript,
};
use agri_shared::{DetectionReport, DiseaseView, Language, VERSION};
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

type AppStateArc = Arc<AppState>;

/// Longest message prefix written to the log
const LOG_MESSAGE_CHARS: usize = 60;

/// Optional `?language=` on read endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiseaseListQuery {
    pub language: Option<String>,
    pub crop: Option<String>,
}

// ============================================================================
// Service info
// ============================================================================

pub fn info_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(service_info))
}

pub const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET /health/live",
    "GET /health/ready",
    "POST /api/v1/chat",
    "GET /api/v1/chat/sessions/:id",
    "GET /api/v1/diseases",
    "GET /api/v1/diseases/:id",
    "POST /api/v1/reconcile",
    "POST /api/v1/detections/interpret",
    "POST /api/v1/detect-disease",
];

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "AgriDetect".to_string(),
        version: VERSION.to_string(),
        languages: Language::ALL.to_vec(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}

fn health_response(state: &AppState, status: &str) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        version: VERSION.to_string(),
        uptime_secs: state.uptime_secs(),
        model_loaded: state.classifier.is_some(),
        model_name: state.classifier.as_ref().map(|c| c.name().to_string()),
        chatbot_available: !state.catalog.is_empty(),
        catalog_size: state.catalog.len(),
        timestamp: Utc::now(),
    }
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    // Chat and catalog work without a model; detection does not.
    let status = if state.classifier.is_some() {
        "healthy"
    } else {
        "degraded"
    };
    Json(health_response(&state, status))
}

async fn live() -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "alive".to_string(),
        timestamp: Utc::now(),
    })
}

async fn ready(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(health_response(&state, "ready"))
}

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/chat/sessions/:id", get(session_transcript))
}

fn truncate_for_log(message: &str) -> String {
    if message.chars().count() <= LOG_MESSAGE_CHARS {
        return message.to_string();
    }
    let head: String = message.chars().take(LOG_MESSAGE_CHARS).collect();
    format!("{}...", head)
}

async fn chat(
    State(state): State<AppStateArc>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let lang = state.language(req.language.as_deref());
    let session_id = req.session();
    info!(
        "  Chat [{}] ({}): {}",
        session_id,
        lang,
        truncate_for_log(&req.message)
    );

    let resolution = match &state.sessions {
        Some(sessions) => {
            sessions
                .exchange(&session_id, &state.resolver, &req.message, lang)
                .await
        }
        None => state.resolver.resolve(&req.message, lang),
    };

    Json(ChatResponse {
        response: resolution.text,
        language: resolution.language,
        intent: resolution.intent,
        template: resolution.template,
        disease_id: resolution.disease_id,
        suggestions: resolution.suggestions,
        session_id,
        context: req.context,
        timestamp: Utc::now(),
    })
}

async fn session_transcript(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Json<SessionTranscript>, ApiError> {
    let sessions = state.sessions.as_ref().ok_or(ApiError::SessionsDisabled)?;
    let turns = sessions
        .transcript(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session '{}'", id)))?;
    Ok(Json(SessionTranscript {
        session_id: id,
        turns,
    }))
}

// ============================================================================
// Disease Catalog Routes
// ============================================================================

pub fn disease_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/v1/diseases", get(list_diseases))
        .route("/api/v1/diseases/:id", get(get_disease))
        .route("/api/v1/reconcile", post(reconcile))
}

async fn list_diseases(
    State(state): State<AppStateArc>,
    Query(query): Query<DiseaseListQuery>,
) -> Json<DiseaseListResponse> {
    let lang = state.language(query.language.as_deref());
    let crop = query
        .crop
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let diseases: Vec<DiseaseView> = match crop {
        Some(crop) => state
            .catalog
            .filter_by_crop(crop)
            .into_iter()
            .map(|e| state.catalog.view(e, lang))
            .collect(),
        None => state
            .catalog
            .all_entries()
            .iter()
            .map(|e| state.catalog.view(e, lang))
            .collect(),
    };

    Json(DiseaseListResponse {
        language: lang,
        crop: crop.map(|c| {
            state
                .catalog
                .crop_token(c)
                .map(String::from)
                .unwrap_or_else(|| c.to_string())
        }),
        total: diseases.len(),
        diseases,
    })
}

async fn get_disease(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<DiseaseView>, ApiError> {
    let lang = state.language(query.language.as_deref());
    let entry = state
        .catalog
        .lookup(&id)
        .ok_or_else(|| ApiError::NotFound(format!("disease '{}'", id)))?;
    Ok(Json(state.catalog.view(entry, lang)))
}

async fn reconcile(
    State(state): State<AppStateArc>,
    Json(req): Json<ReconcileRequest>,
) -> Json<ReconcileResponse> {
    // Nothing to match is an ordinary miss with an empty display name.
    let raw_key = req.raw_key.as_deref().filter(|k| !k.trim().is_empty());
    let raw_label = req.raw_label.as_deref().filter(|l| !l.trim().is_empty());
    let lang = state.language(req.language.as_deref());

    let response = match state.reconciler.explain(raw_key, raw_label) {
        Some(hit) => {
            let view = state.catalog.view(hit.entry, lang);
            ReconcileResponse {
                matched: true,
                step: Some(hit.step),
                display_name: view.name.clone(),
                disease: Some(view),
            }
        }
        None => ReconcileResponse {
            matched: false,
            step: None,
            disease: None,
            display_name: fallback_label(raw_label.or(raw_key).unwrap_or_default()),
        },
    };
    Json(response)
}

// ============================================================================
// Detection Routes
// ============================================================================

pub fn detection_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/v1/detections/interpret", post(interpret))
        .route("/api/v1/detect-disease", post(detect_disease))
}

async fn interpret(
    State(state): State<AppStateArc>,
    Json(req): Json<InterpretRequest>,
) -> Result<Json<DetectionReport>, ApiError> {
    let lang = state.language(req.language.as_deref());
    if !req.predictions.is_empty() {
        return Ok(Json(state.detector.build(&req.predictions, lang)));
    }
    match req.probabilities.as_deref() {
        Some(probs) if !probs.is_empty() => {
            Ok(Json(state.detector.from_probabilities(probs, lang)))
        }
        _ => Err(ApiError::BadRequest(
            "predictions or probabilities are required".to_string(),
        )),
    }
}

/// Multipart part carrying the uploaded image
const UPLOAD_FIELD: &str = "file";

fn is_image(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Body extraction failures keep their 413 when the upload cap was hit.
fn rejected(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(text)
    } else {
        ApiError::BadRequest(text)
    }
}

/// Bytes and media type of the `file` part; other parts are skipped.
async fn image_part(mut multipart: Multipart) -> Result<(Bytes, String), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let part_type = field.content_type().unwrap_or_default().to_string();
        if !is_image(&part_type) {
            return Err(ApiError::BadRequest(format!(
                "'{}' must be an image, got '{}'",
                UPLOAD_FIELD, part_type
            )));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        return Ok((bytes, part_type));
    }
    Err(ApiError::BadRequest(format!(
        "missing '{}' part",
        UPLOAD_FIELD
    )))
}

/// Accepts a multipart form with a `file` part, or a raw `image/*` body.
async fn detect_disease(
    State(state): State<AppStateArc>,
    Query(query): Query<LanguageQuery>,
    request: Request,
) -> Result<Json<DetectionReport>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let (image, image_type) = if content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        image_part(multipart).await?
    } else if is_image(&content_type) {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        (body, content_type)
    } else {
        return Err(ApiError::UnsupportedMediaType(if content_type.is_empty() {
            "missing content type".to_string()
        } else {
            content_type
        }));
    };

    let classifier = state
        .classifier
        .clone()
        .ok_or(ApiError::ModelUnavailable)?;
    let lang = state.language(query.language.as_deref());
    info!("  Classifying {} byte image ({})", image.len(), image_type);

    let probabilities = tokio::task::spawn_blocking(move || classifier.classify(&image))
        .await
        .map_err(|e| ApiError::Internal(format!("classifier task failed: {}", e)))?
        .map_err(|e| match e {
            ClassifierError::InvalidImage(msg) => ApiError::BadRequest(msg),
            ClassifierError::Inference(msg) => {
                warn!("  Inference failed: {}", msg);
                ApiError::Internal(msg)
            }
        })?;

    Ok(Json(state.detector.from_probabilities(&probabilities, lang)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(is_image("image/jpeg"));
        assert!(is_image(" Image/PNG"));
        assert!(!is_image("text/plain"));
        assert!(!is_image(""));
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("court"), "court");
        let long = "é".repeat(100);
        let out = truncate_for_log(&long);
        assert_eq!(out.chars().count(), LOG_MESSAGE_CHARS + 3);
        assert!(out.ends_with("..."));
    }
}

//! HTTP route tests for agrid.
//!
//! Tests verify:
//! - chat replies, session ids from the body or context, transcripts in order
//! - catalog listing, crop filter and 404 for unknown ids
//! - reconcile and interpret endpoints
//! - detect-disease media type, multipart upload, missing model and classifier paths

use agri_shared::rpc::{
    ChatResponse, DiseaseListResponse, HealthResponse, ReconcileResponse, ServiceInfo,
    SessionTranscript,
};
use agri_shared::{DetectionReport, DiseaseView, KnowledgeBase, Language};
use agrid::error::ErrorBody;
use agrid::{router, AppState, Config, FixedClassifier};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn state(config: Config) -> AppState {
    AppState::new(Arc::new(KnowledgeBase::builtin().unwrap()), config)
}

fn app() -> Router {
    router(state(Config::default()))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send<T: DeserializeOwned>(app: Router, req: Request<Body>) -> (StatusCode, T) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_service_info_lists_languages() {
    let (status, info): (_, ServiceInfo) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info.languages, Language::ALL.to_vec());
    assert!(info.endpoints.iter().any(|e| e == "POST /api/v1/chat"));
}

#[tokio::test]
async fn test_health_without_model_is_degraded() {
    let (status, health): (_, HealthResponse) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, "degraded");
    assert!(!health.model_loaded);
    assert!(health.chatbot_available);
    assert_eq!(health.catalog_size, 15);

    let (status, ready): (_, HealthResponse) = send(app(), get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready.status, "ready");

    let (_, live): (_, serde_json::Value) = send(app(), get("/health/live")).await;
    assert_eq!(live["status"], "alive");
}

#[tokio::test]
async fn test_chat_treatment_reply() {
    let req = post_json(
        "/api/v1/chat",
        json!({"message": "traitement mildiou tomate", "language": "fr"}),
    );
    let (status, reply): (_, ChatResponse) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.disease_id.as_deref(), Some("tomato_late_blight"));
    assert!(reply.response.contains("Traitement"));
    assert_eq!(reply.session_id, "default");
    assert_eq!(reply.suggestions.len(), 3);
}

#[tokio::test]
async fn test_chat_empty_message_and_unknown_language() {
    let req = post_json("/api/v1/chat", json!({"language": "xx"}));
    let (status, reply): (_, ChatResponse) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.language, Language::Fr);
    assert!(!reply.response.is_empty());
}

#[tokio::test]
async fn test_chat_null_context_is_accepted() {
    let req = post_json(
        "/api/v1/chat",
        json!({"message": "traitement mildiou tomate", "language": "fr", "context": null}),
    );
    let (status, reply): (_, ChatResponse) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.disease_id.as_deref(), Some("tomato_late_blight"));
    assert!(reply.context.is_empty());
}

#[tokio::test]
async fn test_chat_uses_configured_default_language() {
    let mut config = Config::default();
    config.assistant.default_language = Language::Wo;
    let req = post_json("/api/v1/chat", json!({"message": "arrosage"}));
    let (_, reply): (_, ChatResponse) = send(router(state(config)), req).await;
    assert_eq!(reply.language, Language::Wo);
}

#[tokio::test]
async fn test_chat_session_from_context_and_transcript() {
    let app = app();
    let req = post_json(
        "/api/v1/chat",
        json!({"message": "arrosage", "context": {"session_id": "field-7", "plot": 3}}),
    );
    let (_, reply): (_, ChatResponse) = send(app.clone(), req).await;
    assert_eq!(reply.session_id, "field-7");
    assert_eq!(reply.context["plot"], 3);

    let (status, transcript): (_, SessionTranscript) =
        send(app.clone(), get("/api/v1/chat/sessions/field-7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcript.turns.len(), 2);
    assert_eq!(transcript.turns[0].text, "arrosage");

    let (status, err): (_, ErrorBody) = send(app, get("/api/v1/chat/sessions/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.code, "NOT_FOUND");
}

#[tokio::test]
async fn test_transcript_lists_user_turns_in_order() {
    let app = app();
    for message in ["arrosage", "mildiou", "bio"] {
        let req = post_json(
            "/api/v1/chat",
            json!({"message": message, "session_id": "ordered"}),
        );
        let (status, _): (_, ChatResponse) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, transcript): (_, SessionTranscript) =
        send(app, get("/api/v1/chat/sessions/ordered")).await;
    let asked: Vec<&str> = transcript
        .turns
        .iter()
        .step_by(2)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(asked, ["arrosage", "mildiou", "bio"]);
}

#[tokio::test]
async fn test_sessions_disabled() {
    let mut config = Config::default();
    config.sessions.enabled = false;
    let app = router(state(config));

    let req = post_json(
        "/api/v1/chat",
        json!({"message": "arrosage", "session_id": "s"}),
    );
    let (status, _): (_, ChatResponse) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err): (_, ErrorBody) = send(app, get("/api/v1/chat/sessions/s")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.code, "SESSIONS_DISABLED");
}

#[tokio::test]
async fn test_concurrent_chat_keeps_receipt_pairs() {
    let app = app();
    let mut handles = Vec::new();
    for i in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let req = post_json(
                "/api/v1/chat",
                json!({"message": format!("question {}", i), "session_id": "busy"}),
            );
            app.oneshot(req).await.unwrap().status()
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), StatusCode::OK);
    }

    let (_, transcript): (_, SessionTranscript) =
        send(app, get("/api/v1/chat/sessions/busy")).await;
    assert_eq!(transcript.turns.len(), 20);
    for pair in transcript.turns.chunks(2) {
        assert!(pair[0].intent.is_none());
        assert!(pair[1].intent.is_some());
    }
}

#[tokio::test]
async fn test_list_diseases_with_crop_filter() {
    let (status, all): (_, DiseaseListResponse) = send(app(), get("/api/v1/diseases")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.total, 15);
    assert!(all.crop.is_none());

    let (_, tomato): (_, DiseaseListResponse) =
        send(app(), get("/api/v1/diseases?crop=tomate&language=wo")).await;
    assert_eq!(tomato.total, 10);
    assert_eq!(tomato.crop.as_deref(), Some("tomato"));
    assert_eq!(tomato.language, Language::Wo);

    let (_, none): (_, DiseaseListResponse) =
        send(app(), get("/api/v1/diseases?crop=manioc")).await;
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn test_get_disease_and_404() {
    let (status, view): (_, DiseaseView) =
        send(app(), get("/api/v1/diseases/potato_late_blight")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.name, "Pomme de terre — mildiou");
    assert!(view.requires_action);

    let (status, err): (_, ErrorBody) = send(app(), get("/api/v1/diseases/corn_rust")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(err.error.message.contains("corn_rust"));
}

#[tokio::test]
async fn test_reconcile_endpoint() {
    let req = post_json("/api/v1/reconcile", json!({"raw_label": "Tomato_Late_blight"}));
    let (status, hit): (_, ReconcileResponse) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(hit.matched);
    assert_eq!(hit.disease.unwrap().id, "tomato_late_blight");
    assert_eq!(hit.display_name, "Tomate — mildiou");

    let req = post_json("/api/v1/reconcile", json!({"raw_label": "Apple___Black_rot"}));
    let (_, miss): (_, ReconcileResponse) = send(app(), req).await;
    assert!(!miss.matched);
    assert_eq!(miss.display_name, "Apple Black rot");

    let req = post_json("/api/v1/reconcile", json!({}));
    let (status, empty): (_, ReconcileResponse) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!empty.matched);
    assert!(empty.disease.is_none());
    assert_eq!(empty.display_name, "");
}

#[tokio::test]
async fn test_interpret_predictions_and_probabilities() {
    let req = post_json(
        "/api/v1/detections/interpret",
        json!({"predictions": [{"raw_label": "Potato___Early_blight", "confidence": 0.93}]}),
    );
    let (status, report): (_, DetectionReport) = send(app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.disease_id, "potato_early_blight");
    assert!(report.recognized);
    assert!(report.requires_action);

    let mut probs = vec![0.0_f32; 15];
    probs[7] = 0.4;
    let req = post_json("/api/v1/detections/interpret", json!({"probabilities": probs}));
    let (_, report): (_, DetectionReport) = send(app(), req).await;
    assert_eq!(report.disease_id, "tomato_late_blight");

    let req = post_json(
        "/api/v1/detections/interpret",
        json!({"predictions": [{"raw_label": "Mystery", "confidence": 0.2}]}),
    );
    let (_, report): (_, DetectionReport) = send(app(), req).await;
    assert_eq!(report.disease_id, "disease_unknown");
    assert!(!report.advice.is_empty());

    let req = post_json("/api/v1/detections/interpret", json!({}));
    let (status, _): (_, ErrorBody) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn image_request(content_type: &str, bytes: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/detect-disease")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap()
}

#[tokio::test]
async fn test_detect_rejects_non_image() {
    let (status, err): (_, ErrorBody) = send(app(), image_request("text/plain", b"hello")).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(err.error.code, "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_detect_without_model_is_unavailable() {
    let (status, err): (_, ErrorBody) = send(app(), image_request("image/jpeg", b"\xff\xd8")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err.error.code, "MODEL_UNAVAILABLE");
}

#[tokio::test]
async fn test_detect_with_classifier() {
    let mut probs = vec![0.01_f32; 15];
    probs[13] = 0.9;
    let state = state(Config::default())
        .with_classifier(Arc::new(FixedClassifier::new("fixed-test", probs)));
    let app = router(state);

    let (status, health): (_, HealthResponse) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.model_name.as_deref(), Some("fixed-test"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/detect-disease?language=wo")
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(&b"\x89PNG"[..]))
        .unwrap();
    let (status, report): (_, DetectionReport) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.disease_id, "tomato_mosaic_virus");
    assert_eq!(report.language, Language::Wo);
    assert_eq!(report.top_predictions.len(), 3);

    let (status, _): (_, ErrorBody) = send(app, image_request("image/png", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn multipart_request(part_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(b"--XX\r\n");
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"leaf.jpg\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n--XX--\r\n");
    Request::builder()
        .method("POST")
        .uri("/api/v1/detect-disease")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XX")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_detect_multipart_upload() {
    let mut probs = vec![0.01_f32; 15];
    probs[13] = 0.9;
    let state = state(Config::default())
        .with_classifier(Arc::new(FixedClassifier::new("fixed-test", probs)));
    let app = router(state);

    let (status, report): (_, DetectionReport) =
        send(app.clone(), multipart_request("image/jpeg", b"\xff\xd8\xff")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.disease_id, "tomato_mosaic_virus");

    let (status, err): (_, ErrorBody) =
        send(app, multipart_request("text/plain", b"not a leaf")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err.error.message.contains("image"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = Config::default();
    config.server.max_image_mb = 0;
    let app = router(state(config));
    let response = app
        .oneshot(image_request("image/jpeg", b"\xff\xd8\xff"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

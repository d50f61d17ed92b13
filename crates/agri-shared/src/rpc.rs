//! JSON wire types shared by agrid and agrictl.

use crate::catalog::DiseaseView;
use crate::detection::Prediction;
use crate::intent::{ChatIntent, TemplateKind};
use crate::locale::Language;
use crate::reconcile::ReconcileStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Session used when the caller names none.
pub const DEFAULT_SESSION: &str = "default";

/// POST /api/v1/chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Opaque caller context, echoed back unchanged. `null` reads as empty.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "serde_json::Map::is_empty"
    )]
    pub context: serde_json::Map<String, serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Session id from the request, else from `context.session_id`, else
    /// the default session.
    pub fn session(&self) -> String {
        self.session_id
            .as_deref()
            .or_else(|| self.context.get("session_id").and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION)
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub language: Language,
    pub intent: ChatIntent,
    pub template: TemplateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_id: Option<String>,
    pub suggestions: Vec<String>,
    pub session_id: String,
    pub context: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<ChatIntent>,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            intent: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, intent: ChatIntent) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            intent: Some(intent),
            timestamp: Utc::now(),
        }
    }
}

/// GET /api/v1/chat/sessions/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTranscript {
    pub session_id: String,
    pub turns: Vec<ChatTurn>,
}

/// GET /api/v1/diseases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseListResponse {
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    pub total: usize,
    pub diseases: Vec<DiseaseView>,
}

/// POST /api/v1/reconcile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<ReconcileStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease: Option<DiseaseView>,
    /// Localized name when matched, the raw label with spaces otherwise
    pub display_name: String,
}

/// POST /api/v1/detections/interpret
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpretRequest {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    /// Raw class probabilities; used when `predictions` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// GET /health and /health/ready
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub chatbot_available: bool,
    pub catalog_size: usize,
    pub timestamp: DateTime<Utc>,
}

/// GET /health/live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub languages: Vec<Language>,
    pub endpoints: Vec<String>,
}

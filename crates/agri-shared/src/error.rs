//! Error types for the knowledge base.
//!
//! Lookups never fail: a missing disease is `None`. The only errors in this
//! crate are data-integrity defects found while building a `KnowledgeBase`,
//! and they are meant to stop the process at startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Duplicate disease id: {0}")]
    DuplicateDisease(String),

    #[error("Duplicate treatment id: {0}")]
    DuplicateTreatment(String),

    #[error("Disease '{disease}' references unknown treatment '{treatment}'")]
    DanglingTreatment { disease: String, treatment: String },

    #[error("Disease '{0}' has an empty primary name")]
    EmptyName(String),

    #[error("Disease id '{id}' does not match crop '{crop}' and condition '{condition}'")]
    IdMismatch {
        id: String,
        crop: String,
        condition: String,
    },

    #[error("Disease '{0}': severity must be none exactly when the condition is healthy")]
    SeverityMismatch(String),

    #[error("Alias '{alias}' points to unknown target '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("Knowledge base is empty")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KnowledgeError {
    /// Stable short code, used in startup logs.
    pub fn code(&self) -> &'static str {
        match self {
            KnowledgeError::DuplicateDisease(_) => "duplicate_disease",
            KnowledgeError::DuplicateTreatment(_) => "duplicate_treatment",
            KnowledgeError::DanglingTreatment { .. } => "dangling_treatment",
            KnowledgeError::EmptyName(_) => "empty_name",
            KnowledgeError::IdMismatch { .. } => "id_mismatch",
            KnowledgeError::SeverityMismatch(_) => "severity_mismatch",
            KnowledgeError::UnknownAliasTarget { .. } => "unknown_alias_target",
            KnowledgeError::Empty => "empty",
            KnowledgeError::Io(_) => "io",
            KnowledgeError::Json(_) => "json",
        }
    }
}

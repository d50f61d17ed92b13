//! Shared core for AgriDetect components.
//!
//! Knowledge base, catalog lookups, classifier-label reconciliation, the
//! chat intent resolver and the JSON wire types used by agrid and agrictl.

pub mod catalog;
pub mod composer;
pub mod detection;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod locale;
pub mod normalize;
pub mod reconcile;
pub mod rpc;

pub use catalog::{Catalog, DiseaseEntry, DiseaseView, Severity, TreatmentEntry, TreatmentView};
pub use composer::{Composer, Phrasebook};
pub use detection::{DetectionBuilder, DetectionReport, Prediction, ScoredPrediction};
pub use error::KnowledgeError;
pub use intent::rules::{ResponseShape, RuleSet, Topic};
pub use intent::{ChatIntent, MatchStage, Resolution, Resolver, TemplateKind};
pub use knowledge::{KnowledgeBase, KnowledgeData, Vocabulary};
pub use locale::{Language, LocalizedText};
pub use reconcile::{ReconcileStep, Reconciler};

/// Package version, shared by the daemon banner and the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default daemon address used by agrictl.
pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:8000";

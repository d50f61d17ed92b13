//! Disease catalog and localization store.
//!
//! Read-only view over the `KnowledgeBase`: lookup by id, listing in catalog
//! order, and filtering by crop name in any supported language.

use crate::knowledge::KnowledgeBase;
use crate::locale::{Language, LocalizedText};
use crate::normalize::{fold_accents, normalize_message};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Condition token used by healthy-state entries.
pub const HEALTHY: &str = "healthy";

/// How urgently a condition needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Moderate,
    High,
}

impl Severity {
    /// Display label. Severity wording is shared by every locale.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Aucune",
            Self::Moderate => "Modérée",
            Self::High => "Élevée",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Moderate => "moderate",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// One (crop, condition) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEntry {
    /// `<crop>_<condition>`, e.g. `tomato_late_blight`
    pub id: String,
    /// Crop token, e.g. `tomato`
    pub crop: String,
    /// Condition token, e.g. `late_blight` or `healthy`
    pub condition: String,
    pub crop_name: LocalizedText,
    pub condition_name: LocalizedText,
    /// Full display name, e.g. "Tomate — mildiou"
    pub name: LocalizedText,
    /// English condition text as used in classifier training labels
    pub condition_en: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    /// Treatment ids, in order of preference
    #[serde(default)]
    pub treatments: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
}

impl DiseaseEntry {
    pub fn is_healthy(&self) -> bool {
        self.condition == HEALTHY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Application guidance (frequency, timing, label instructions)
    pub application: String,
    /// Acceptable in organic growing
    pub organic: bool,
}

/// Treatment as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub application: String,
    pub organic: bool,
}

impl From<&TreatmentEntry> for TreatmentView {
    fn from(t: &TreatmentEntry) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            description: t.description.clone(),
            application: t.application.clone(),
            organic: t.organic,
        }
    }
}

/// A disease entry rendered for one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseView {
    pub id: String,
    pub name: String,
    pub crop: String,
    pub condition: String,
    pub severity: Severity,
    pub severity_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    pub treatments: Vec<TreatmentView>,
    pub prevention: Vec<String>,
    pub requires_action: bool,
}

/// Read-only catalog handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Catalog {
    kb: Arc<KnowledgeBase>,
}

impl Catalog {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Entry for `id`, or None. Unknown ids are a normal outcome.
    pub fn lookup(&self, id: &str) -> Option<&DiseaseEntry> {
        self.kb.disease(id)
    }

    /// All entries in catalog order.
    pub fn all_entries(&self) -> &[DiseaseEntry] {
        self.kb.diseases()
    }

    pub fn len(&self) -> usize {
        self.kb.diseases().len()
    }

    pub fn is_empty(&self) -> bool {
        self.kb.diseases().is_empty()
    }

    /// Distinct crop tokens in catalog order.
    pub fn crops(&self) -> Vec<&str> {
        let mut crops: Vec<&str> = Vec::new();
        for entry in self.kb.diseases() {
            if !crops.contains(&entry.crop.as_str()) {
                crops.push(&entry.crop);
            }
        }
        crops
    }

    /// Resolve a crop name in any language (or a crop token) to its token.
    pub fn crop_token(&self, crop_name: &str) -> Option<&str> {
        let wanted = fold_accents(&normalize_message(crop_name, true));
        if wanted.is_empty() {
            return None;
        }

        if let Some(alias) = self
            .kb
            .vocabulary()
            .crop_aliases
            .iter()
            .find(|a| normalize_message(&a.text, true) == wanted)
        {
            return Some(alias.token.as_str());
        }

        self.kb
            .diseases()
            .iter()
            .find(|e| {
                e.crop == wanted
                    || e
                        .crop_name
                        .variants()
                        .any(|v| normalize_message(v, true) == wanted)
            })
            .map(|e| e.crop.as_str())
    }

    /// Entries for a crop, matched case- and accent-insensitively against
    /// known aliases ("tomato", "tomate" and "tomaat" are one crop group).
    /// Unknown crops yield an empty list.
    pub fn filter_by_crop(&self, crop_name: &str) -> Vec<&DiseaseEntry> {
        match self.crop_token(crop_name) {
            Some(token) => self
                .kb
                .diseases()
                .iter()
                .filter(|e| e.crop == token)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn treatment(&self, id: &str) -> Option<&TreatmentEntry> {
        self.kb.treatment(id)
    }

    /// Resolved treatments of an entry, in the entry's order.
    pub fn treatments_for(&self, entry: &DiseaseEntry) -> Vec<&TreatmentEntry> {
        entry
            .treatments
            .iter()
            .filter_map(|id| self.kb.treatment(id))
            .collect()
    }

    /// Render an entry for one language.
    pub fn view(&self, entry: &DiseaseEntry, lang: Language) -> DiseaseView {
        DiseaseView {
            id: entry.id.clone(),
            name: entry.name.get(lang).to_string(),
            crop: entry.crop_name.get(lang).to_string(),
            condition: entry.condition_name.get(lang).to_string(),
            severity: entry.severity,
            severity_label: entry.severity.label().to_string(),
            symptoms: entry.symptoms.clone(),
            treatments: self
                .treatments_for(entry)
                .into_iter()
                .map(TreatmentView::from)
                .collect(),
            prevention: entry.prevention.clone(),
            requires_action: !entry.is_healthy(),
        }
    }
}

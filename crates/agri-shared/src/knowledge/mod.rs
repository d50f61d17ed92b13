//! Knowledge base: diseases, treatments and matching vocabulary.
//!
//! Built once at process start, validated, then shared read-only through an
//! `Arc`. The built-in tables live in `builtin.rs`; a JSON file with the same
//! shape can replace them.

mod builtin;

use crate::catalog::{DiseaseEntry, Severity, TreatmentEntry};
use crate::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Free-text alias for a crop or condition token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub text: String,
    pub token: String,
}

impl Alias {
    pub fn new(text: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token: token.into(),
        }
    }
}

/// Classifier training label mapped to a catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAlias {
    pub label: String,
    pub id: String,
}

/// Matching vocabulary. Order matters: earlier aliases win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    pub crop_aliases: Vec<Alias>,
    #[serde(default)]
    pub condition_aliases: Vec<Alias>,
    #[serde(default)]
    pub label_aliases: Vec<LabelAlias>,
    /// Classifier output index -> dataset label
    #[serde(default)]
    pub class_labels: Vec<String>,
}

/// Serialized form of a knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeData {
    pub diseases: Vec<DiseaseEntry>,
    #[serde(default)]
    pub treatments: Vec<TreatmentEntry>,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

/// Validated, immutable knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    data: KnowledgeData,
    disease_index: HashMap<String, usize>,
    treatment_index: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// Validate `data` and build the lookup indexes.
    pub fn new(data: KnowledgeData) -> Result<Self, KnowledgeError> {
        if data.diseases.is_empty() {
            return Err(KnowledgeError::Empty);
        }

        let mut treatment_index = HashMap::new();
        for (i, t) in data.treatments.iter().enumerate() {
            if treatment_index.insert(t.id.clone(), i).is_some() {
                return Err(KnowledgeError::DuplicateTreatment(t.id.clone()));
            }
        }

        let mut disease_index = HashMap::new();
        for (i, d) in data.diseases.iter().enumerate() {
            validate_entry(d, &treatment_index)?;
            if disease_index.insert(d.id.clone(), i).is_some() {
                return Err(KnowledgeError::DuplicateDisease(d.id.clone()));
            }
        }

        validate_vocabulary(&data, &disease_index)?;

        Ok(Self {
            data,
            disease_index,
            treatment_index,
        })
    }

    /// The tables compiled into the binary.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::new(builtin::data())
    }

    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeError> {
        let data: KnowledgeData = serde_json::from_str(json)?;
        Self::new(data)
    }

    /// Load a JSON knowledge file.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path)?;
        let kb = Self::from_json_str(&content)?;
        info!(
            "Loaded knowledge base from {} ({} diseases, {} treatments)",
            path.display(),
            kb.data.diseases.len(),
            kb.data.treatments.len()
        );
        Ok(kb)
    }

    pub fn disease(&self, id: &str) -> Option<&DiseaseEntry> {
        self.disease_index.get(id).map(|&i| &self.data.diseases[i])
    }

    pub fn treatment(&self, id: &str) -> Option<&TreatmentEntry> {
        self.treatment_index.get(id).map(|&i| &self.data.treatments[i])
    }

    pub fn diseases(&self) -> &[DiseaseEntry] {
        &self.data.diseases
    }

    pub fn treatments(&self) -> &[TreatmentEntry] {
        &self.data.treatments
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.data.vocabulary
    }

    /// Serialized form, e.g. to dump the built-in tables as a starting file.
    pub fn data(&self) -> &KnowledgeData {
        &self.data
    }
}

fn validate_entry(
    d: &DiseaseEntry,
    treatments: &HashMap<String, usize>,
) -> Result<(), KnowledgeError> {
    if d.name.primary().trim().is_empty()
        || d.crop_name.primary().trim().is_empty()
        || d.condition_name.primary().trim().is_empty()
    {
        return Err(KnowledgeError::EmptyName(d.id.clone()));
    }

    if d.id != format!("{}_{}", d.crop, d.condition) {
        return Err(KnowledgeError::IdMismatch {
            id: d.id.clone(),
            crop: d.crop.clone(),
            condition: d.condition.clone(),
        });
    }

    if (d.severity == Severity::None) != d.is_healthy() {
        return Err(KnowledgeError::SeverityMismatch(d.id.clone()));
    }

    if let Some(missing) = d.treatments.iter().find(|t| !treatments.contains_key(*t)) {
        return Err(KnowledgeError::DanglingTreatment {
            disease: d.id.clone(),
            treatment: missing.clone(),
        });
    }

    Ok(())
}

fn validate_vocabulary(
    data: &KnowledgeData,
    diseases: &HashMap<String, usize>,
) -> Result<(), KnowledgeError> {
    let crops: HashSet<&str> = data.diseases.iter().map(|d| d.crop.as_str()).collect();
    let conditions: HashSet<&str> = data.diseases.iter().map(|d| d.condition.as_str()).collect();
    let vocab = &data.vocabulary;

    let unknown = |alias: &str, target: &str| KnowledgeError::UnknownAliasTarget {
        alias: alias.to_string(),
        target: target.to_string(),
    };

    for a in &vocab.crop_aliases {
        if !crops.contains(a.token.as_str()) {
            return Err(unknown(&a.text, &a.token));
        }
    }
    for a in &vocab.condition_aliases {
        if !conditions.contains(a.token.as_str()) {
            return Err(unknown(&a.text, &a.token));
        }
    }
    for a in &vocab.label_aliases {
        if !diseases.contains_key(&a.id) {
            return Err(unknown(&a.label, &a.id));
        }
    }

    Ok(())
}

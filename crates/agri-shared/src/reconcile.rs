//! Prediction-to-catalog reconciler.
//!
//! Classifier labels are dataset directory names ("Tomato__Target_Spot") and
//! rarely equal catalog ids. Rules are tried in a fixed order; within a rule
//! the first entry in catalog order wins.

use crate::catalog::DiseaseEntry;
use crate::knowledge::KnowledgeBase;
use crate::normalize::{contains_phrase, fold_accents, normalize_label, words};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStep {
    ExactKey,
    LabelAlias,
    IdSubstring,
    ConditionEn,
    ConditionPrimary,
}

impl std::fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ExactKey => "exact_key",
            Self::LabelAlias => "label_alias",
            Self::IdSubstring => "id_substring",
            Self::ConditionEn => "condition_en",
            Self::ConditionPrimary => "condition_primary",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reconciled<'a> {
    pub entry: &'a DiseaseEntry,
    pub step: ReconcileStep,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    kb: Arc<KnowledgeBase>,
    /// Per entry, in catalog order: (id, english condition, primary condition),
    /// each normalized as a label.
    normalized: Vec<(String, String, String)>,
}

impl Reconciler {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        let normalized = kb
            .diseases()
            .iter()
            .map(|e| {
                (
                    normalize_label(&e.id),
                    normalize_label(&e.condition_en),
                    fold_accents(&normalize_label(e.condition_name.primary())),
                )
            })
            .collect();
        Self { kb, normalized }
    }

    /// Map classifier output onto a catalog entry. None is a normal outcome.
    pub fn reconcile(
        &self,
        raw_key: Option<&str>,
        raw_label: Option<&str>,
    ) -> Option<&DiseaseEntry> {
        self.explain(raw_key, raw_label).map(|r| r.entry)
    }

    /// Like `reconcile`, also reporting which rule matched.
    pub fn explain(
        &self,
        raw_key: Option<&str>,
        raw_label: Option<&str>,
    ) -> Option<Reconciled<'_>> {
        if let Some(entry) = raw_key.and_then(|k| self.kb.disease(k)) {
            return Some(Reconciled {
                entry,
                step: ReconcileStep::ExactKey,
            });
        }

        if let Some(entry) = [raw_label, raw_key]
            .into_iter()
            .flatten()
            .find_map(|raw| self.by_label_alias(raw))
        {
            return Some(Reconciled {
                entry,
                step: ReconcileStep::LabelAlias,
            });
        }

        // Without a label the key is the best text we have.
        let label = normalize_label(raw_label.or(raw_key).unwrap_or_default());
        if label.is_empty() {
            return None;
        }

        let found = self
            .first_overlap(|(id, _, _)| id, &label)
            .map(|e| (e, ReconcileStep::IdSubstring))
            .or_else(|| {
                self.first_overlap(|(_, en, _)| en, &label)
                    .map(|e| (e, ReconcileStep::ConditionEn))
            })
            .or_else(|| {
                let folded = fold_accents(&label);
                self.first_overlap(|(_, _, primary)| primary, &folded)
                    .map(|e| (e, ReconcileStep::ConditionPrimary))
            });

        match found {
            Some((entry, step)) => Some(Reconciled { entry, step }),
            None => {
                debug!("No catalog entry for label '{}'", label);
                None
            }
        }
    }

    fn by_label_alias(&self, raw: &str) -> Option<&DiseaseEntry> {
        let raw = raw.trim();
        self.kb
            .vocabulary()
            .label_aliases
            .iter()
            .find(|a| a.label == raw)
            .and_then(|a| self.kb.disease(&a.id))
    }

    /// First entry whose selected text contains `label` or is contained by it.
    fn first_overlap<F>(&self, field: F, label: &str) -> Option<&DiseaseEntry>
    where
        F: Fn(&(String, String, String)) -> &String,
    {
        self.normalized
            .iter()
            .position(|n| {
                let text = field(n);
                !text.is_empty() && (label.contains(text.as_str()) || text.contains(label))
            })
            .map(|i| &self.kb.diseases()[i])
    }
}

/// Display text for a label that did not reconcile: underscores become spaces.
pub fn fallback_label(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Guess the display crop from an unreconciled label. "Non spécifié" when
/// no known crop word appears.
pub fn guess_crop(kb: &KnowledgeBase, raw: &str) -> String {
    let label = fold_accents(&normalize_label(raw));
    let label_words = words(&label);
    for alias in &kb.vocabulary().crop_aliases {
        let folded = fold_accents(&alias.text.to_lowercase());
        let phrase: Vec<String> = words(&folded).into_iter().map(str::to_string).collect();
        if contains_phrase(&label_words, &phrase) {
            if let Some(entry) = kb.diseases().iter().find(|e| e.crop == alias.token) {
                return entry.crop_name.primary().to_string();
            }
        }
    }
    "Non spécifié".to_string()
}

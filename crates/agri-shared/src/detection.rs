//! Detection reports built from classifier output.
//!
//! The classifier is external; it hands over either a probability vector or
//! ranked predictions. The best prediction is reconciled against the catalog
//! and rendered in the requested language. A low-confidence miss becomes the
//! "unknown" report with advice to retake the photo.

use crate::catalog::{Catalog, DiseaseEntry, Severity, TreatmentView};
use crate::locale::{Language, LocalizedText};
use crate::reconcile::{fallback_label, guess_crop, Reconciler};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

pub const UNKNOWN_DISEASE_ID: &str = "disease_unknown";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_TOP_K: usize = 3;
const MAX_PREVENTION_TIPS: usize = 5;
const UNKNOWN_SEVERITY: &str = "Inconnue";
const UNKNOWN_CROP: &str = "Non spécifié";

/// One ranked classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_index: Option<usize>,
    pub confidence: f32,
}

/// A prediction as shown in the report's alternatives list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPrediction {
    pub disease_id: String,
    pub disease_name: String,
    pub confidence: f32,
    pub recognized: bool,
    pub severity_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub disease_id: String,
    pub disease_name: String,
    /// The best prediction matched a catalog entry
    pub recognized: bool,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub severity_label: String,
    pub affected_crop: String,
    pub treatments: Vec<TreatmentView>,
    /// Extra guidance, e.g. how to take a better photo
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advice: Vec<String>,
    pub prevention_tips: Vec<String>,
    pub requires_action: bool,
    pub top_predictions: Vec<ScoredPrediction>,
    pub language: Language,
}

/// Rank a probability vector. Ties keep index order; `k` below one means one.
pub fn top_k(probabilities: &[f32], labels: &[String], k: usize) -> Vec<Prediction> {
    let mut indices: Vec<usize> = (0..probabilities.len()).collect();
    indices.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(Ordering::Equal)
    });
    indices
        .into_iter()
        .take(k.max(1))
        .map(|i| Prediction {
            raw_key: None,
            raw_label: labels.get(i).cloned(),
            class_index: Some(i),
            confidence: probabilities[i],
        })
        .collect()
}

fn unknown_name() -> LocalizedText {
    LocalizedText::tri("Maladie non identifiée", "Xamul", "Xamul")
}

#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    catalog: Catalog,
    reconciler: Reconciler,
    class_labels: Vec<String>,
    threshold: f32,
    top_k: usize,
}

impl DetectionBuilder {
    pub fn new(catalog: Catalog, reconciler: Reconciler) -> Self {
        let class_labels = catalog.knowledge().vocabulary().class_labels.clone();
        Self {
            catalog,
            reconciler,
            class_labels,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Replace the classifier's index -> label order. An empty list keeps
    /// the knowledge base default.
    pub fn with_class_labels(mut self, labels: Vec<String>) -> Self {
        if !labels.is_empty() {
            self.class_labels = labels;
        }
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    /// Report for a raw probability vector.
    pub fn from_probabilities(&self, probabilities: &[f32], lang: Language) -> DetectionReport {
        let ranked = top_k(probabilities, &self.class_labels, self.top_k);
        self.build(&ranked, lang)
    }

    /// Report for ranked predictions. Order is by confidence regardless of
    /// input order.
    pub fn build(&self, predictions: &[Prediction], lang: Language) -> DetectionReport {
        let mut ranked: Vec<&Prediction> = predictions.iter().collect();
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(self.top_k);

        let top_predictions: Vec<ScoredPrediction> =
            ranked.iter().map(|p| self.score(p, lang)).collect();

        let Some(best) = ranked.first() else {
            debug!("No predictions to report");
            return self.unknown(0.0, top_predictions, lang);
        };

        let label = self.label_of(best);
        let report = match self.reconciler.reconcile(best.raw_key.as_deref(), label.as_deref()) {
            Some(entry) => self.recognized(entry, best.confidence, top_predictions, lang),
            None if best.confidence < self.threshold => {
                self.unknown(best.confidence, top_predictions, lang)
            }
            None => self.unrecognized(best, label.as_deref(), top_predictions, lang),
        };

        info!(
            "Detection: {} ({:.1}%)",
            report.disease_id,
            report.confidence * 100.0
        );
        report
    }

    /// Label text for a prediction: explicit label, else the class index
    /// looked up in the label order. Out-of-range indices have no label.
    fn label_of(&self, p: &Prediction) -> Option<String> {
        p.raw_label.clone().or_else(|| {
            p.class_index
                .and_then(|i| self.class_labels.get(i))
                .cloned()
        })
    }

    fn score(&self, p: &Prediction, lang: Language) -> ScoredPrediction {
        let label = self.label_of(p);
        match self.reconciler.reconcile(p.raw_key.as_deref(), label.as_deref()) {
            Some(entry) => ScoredPrediction {
                disease_id: entry.id.clone(),
                disease_name: entry.name.get(lang).to_string(),
                confidence: p.confidence,
                recognized: true,
                severity_label: entry.severity.label().to_string(),
                raw_label: label,
            },
            None => {
                let raw = label.as_deref().or(p.raw_key.as_deref());
                ScoredPrediction {
                    disease_id: p
                        .raw_key
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_DISEASE_ID.to_string()),
                    disease_name: match raw {
                        Some(raw) => fallback_label(raw),
                        None => unknown_name().get(lang).to_string(),
                    },
                    confidence: p.confidence,
                    recognized: false,
                    severity_label: UNKNOWN_SEVERITY.to_string(),
                    raw_label: label,
                }
            }
        }
    }

    fn recognized(
        &self,
        entry: &DiseaseEntry,
        confidence: f32,
        top_predictions: Vec<ScoredPrediction>,
        lang: Language,
    ) -> DetectionReport {
        let view = self.catalog.view(entry, lang);
        DetectionReport {
            disease_id: view.id,
            disease_name: view.name,
            recognized: true,
            confidence,
            severity: Some(view.severity),
            severity_label: view.severity_label,
            affected_crop: view.crop,
            treatments: view.treatments,
            advice: Vec::new(),
            prevention_tips: view
                .prevention
                .into_iter()
                .take(MAX_PREVENTION_TIPS)
                .collect(),
            requires_action: view.requires_action,
            top_predictions,
            language: lang,
        }
    }

    /// Confident prediction the catalog does not know: show the raw label.
    fn unrecognized(
        &self,
        best: &Prediction,
        label: Option<&str>,
        top_predictions: Vec<ScoredPrediction>,
        lang: Language,
    ) -> DetectionReport {
        let raw = label.or(best.raw_key.as_deref()).unwrap_or_default();
        let name = if raw.trim().is_empty() {
            unknown_name().get(lang).to_string()
        } else {
            fallback_label(raw)
        };
        DetectionReport {
            disease_id: best
                .raw_key
                .clone()
                .unwrap_or_else(|| UNKNOWN_DISEASE_ID.to_string()),
            disease_name: name,
            recognized: false,
            confidence: best.confidence,
            severity: None,
            severity_label: UNKNOWN_SEVERITY.to_string(),
            affected_crop: guess_crop(self.catalog.knowledge(), raw),
            treatments: Vec::new(),
            advice: Vec::new(),
            prevention_tips: vec![
                "Surveillez régulièrement vos cultures.".to_string(),
                "Enlevez les parties très atteintes.".to_string(),
            ],
            requires_action: true,
            top_predictions,
            language: lang,
        }
    }

    fn unknown(
        &self,
        confidence: f32,
        top_predictions: Vec<ScoredPrediction>,
        lang: Language,
    ) -> DetectionReport {
        DetectionReport {
            disease_id: UNKNOWN_DISEASE_ID.to_string(),
            disease_name: unknown_name().get(lang).to_string(),
            recognized: false,
            confidence,
            severity: None,
            severity_label: UNKNOWN_SEVERITY.to_string(),
            affected_crop: UNKNOWN_CROP.to_string(),
            treatments: Vec::new(),
            advice: vec![
                "Refaites une photo plus nette.".to_string(),
                "Évitez les ombres / contre-jour.".to_string(),
            ],
            prevention_tips: vec![
                "Surveillez régulièrement vos plants.".to_string(),
                "Évitez l'humidité foliaire prolongée.".to_string(),
            ],
            requires_action: false,
            top_predictions,
            language: lang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use std::sync::Arc;

    fn builder() -> DetectionBuilder {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        DetectionBuilder::new(Catalog::new(kb.clone()), Reconciler::new(kb))
    }

    #[test]
    fn test_top_k_orders_and_keeps_ties_stable() {
        let labels: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let ranked = top_k(&[0.1, 0.4, 0.4, 0.1], &labels, 3);
        let order: Vec<usize> = ranked.iter().filter_map(|p| p.class_index).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert_eq!(ranked[0].raw_label.as_deref(), Some("b"));

        assert_eq!(top_k(&[0.2, 0.8], &labels, 0).len(), 1);
        assert!(top_k(&[], &labels, 3).is_empty());
    }

    #[test]
    fn test_probabilities_map_through_class_labels() {
        let b = builder();
        let mut probs = vec![0.0_f32; 15];
        probs[7] = 0.92; // Tomato_Late_blight
        probs[6] = 0.05;
        let report = b.from_probabilities(&probs, Language::Fr);
        assert_eq!(report.disease_id, "tomato_late_blight");
        assert_eq!(report.disease_name, "Tomate — mildiou");
        assert_eq!(report.severity, Some(Severity::High));
        assert!(report.requires_action);
        assert_eq!(report.top_predictions.len(), 3);
        assert_eq!(report.top_predictions[1].disease_id, "tomato_early_blight");
    }

    #[test]
    fn test_low_confidence_miss_is_unknown() {
        let b = builder();
        let report = b.build(
            &[Prediction {
                raw_key: None,
                raw_label: Some("Grape___Black_rot".into()),
                class_index: None,
                confidence: 0.41,
            }],
            Language::Wo,
        );
        assert_eq!(report.disease_id, UNKNOWN_DISEASE_ID);
        assert_eq!(report.disease_name, "Xamul");
        assert_eq!(report.affected_crop, "Non spécifié");
        assert!(report.advice[0].contains("photo"));
    }

    #[test]
    fn test_low_confidence_match_is_still_reported() {
        let b = builder();
        let report = b.build(
            &[Prediction {
                raw_key: Some("pepper_healthy".into()),
                raw_label: None,
                class_index: None,
                confidence: 0.3,
            }],
            Language::Fr,
        );
        assert_eq!(report.disease_id, "pepper_healthy");
        assert!(!report.requires_action);
        assert!(report.treatments.is_empty());
    }

    #[test]
    fn test_confident_miss_shows_raw_label() {
        let b = builder();
        let report = b.build(
            &[Prediction {
                raw_key: None,
                raw_label: Some("Tomato_Blossom_end_rot".into()),
                class_index: None,
                confidence: 0.95,
            }],
            Language::Fr,
        );
        assert!(!report.recognized);
        assert_eq!(report.disease_name, "Tomato Blossom end rot");
        assert_eq!(report.affected_crop, "Tomate");
        assert_eq!(report.severity_label, "Inconnue");
    }

    #[test]
    fn test_out_of_range_index_is_unknown() {
        let b = builder();
        let report = b.build(
            &[Prediction {
                raw_key: None,
                raw_label: None,
                class_index: Some(99),
                confidence: 0.5,
            }],
            Language::Fr,
        );
        assert_eq!(report.disease_id, UNKNOWN_DISEASE_ID);
        assert_eq!(report.disease_name, "Maladie non identifiée");
    }
}

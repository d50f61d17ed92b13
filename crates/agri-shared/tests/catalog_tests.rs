//! Catalog and knowledge base integrity tests.
//!
//! Tests verify:
//! - lookup round-trips every id
//! - every referenced treatment exists
//! - crop aliases in any language select the same entries
//! - invalid knowledge data is rejected at construction

use agri_shared::catalog::{DiseaseEntry, Severity, TreatmentEntry};
use agri_shared::knowledge::{Alias, KnowledgeData, Vocabulary};
use agri_shared::{Catalog, KnowledgeBase, KnowledgeError, Language, LocalizedText};
use std::io::Write;
use std::sync::Arc;

fn catalog() -> Catalog {
    Catalog::new(Arc::new(KnowledgeBase::builtin().unwrap()))
}

fn ids(entries: &[&DiseaseEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id.clone()).collect()
}

fn minimal_entry(id: &str, crop: &str, condition: &str, severity: Severity) -> DiseaseEntry {
    DiseaseEntry {
        id: id.to_string(),
        crop: crop.to_string(),
        condition: condition.to_string(),
        crop_name: LocalizedText::new("Maïs"),
        condition_name: LocalizedText::new("rouille"),
        name: LocalizedText::new("Maïs — rouille"),
        condition_en: "Common rust".to_string(),
        severity,
        symptoms: None,
        treatments: Vec::new(),
        prevention: Vec::new(),
    }
}

fn minimal_data() -> KnowledgeData {
    KnowledgeData {
        diseases: vec![minimal_entry("corn_rust", "corn", "rust", Severity::Moderate)],
        treatments: vec![TreatmentEntry {
            id: "fungicide".to_string(),
            name: "Fongicide".to_string(),
            description: "Anti-rouille".to_string(),
            application: "Au début des symptômes".to_string(),
            organic: false,
        }],
        vocabulary: Vocabulary::default(),
    }
}

#[test]
fn test_lookup_round_trips_every_id() {
    let catalog = catalog();
    for entry in catalog.all_entries() {
        assert_eq!(catalog.lookup(&entry.id).unwrap().id, entry.id);
    }
}

#[test]
fn test_every_treatment_reference_resolves() {
    let catalog = catalog();
    for entry in catalog.all_entries() {
        for id in &entry.treatments {
            assert!(catalog.treatment(id).is_some(), "{} -> {}", entry.id, id);
        }
        assert_eq!(catalog.treatments_for(entry).len(), entry.treatments.len());
    }
}

#[test]
fn test_healthy_iff_no_severity() {
    for entry in catalog().all_entries() {
        assert_eq!(entry.is_healthy(), entry.severity == Severity::None, "{}", entry.id);
        if entry.is_healthy() {
            assert!(entry.treatments.is_empty());
        }
    }
}

#[test]
fn test_filter_by_crop_alias_equivalence() {
    let catalog = catalog();
    let english = ids(&catalog.filter_by_crop("tomato"));
    assert_eq!(english.len(), 10);
    assert_eq!(english, ids(&catalog.filter_by_crop("tomate")));
    assert_eq!(english, ids(&catalog.filter_by_crop("Tomaat")));
    assert_eq!(english, ids(&catalog.filter_by_crop("  TOMATES ")));

    let pepper = ids(&catalog.filter_by_crop("poivron"));
    assert_eq!(pepper, vec!["pepper_bacterial_spot", "pepper_healthy"]);
    assert_eq!(pepper, ids(&catalog.filter_by_crop("Pimó")));
    assert_eq!(pepper, ids(&catalog.filter_by_crop("pimo")));
}

#[test]
fn test_filter_by_unknown_crop_is_empty() {
    assert!(catalog().filter_by_crop("manioc").is_empty());
    assert!(catalog().filter_by_crop("").is_empty());
}

#[test]
fn test_all_entries_keep_catalog_order() {
    let catalog = catalog();
    let all = catalog.all_entries();
    assert_eq!(all.first().unwrap().id, "pepper_bacterial_spot");
    assert_eq!(all.last().unwrap().id, "tomato_healthy");
}

#[test]
fn test_alternate_names_fall_back_to_primary() {
    let catalog = catalog();
    let entry = catalog.lookup("potato_late_blight").unwrap();
    assert_eq!(entry.name.get(Language::Fr), "Pomme de terre — mildiou");
    assert_eq!(entry.name.get(Language::Pu), "Late blight");
    // treatments carry only primary-language text
    let view = catalog.view(entry, Language::Pu);
    assert_eq!(view.treatments[0].name, "Fongicide systémique");
}

#[test]
fn test_minimal_knowledge_is_valid() {
    let kb = KnowledgeBase::new(minimal_data()).unwrap();
    assert_eq!(kb.diseases().len(), 1);
}

#[test]
fn test_dangling_treatment_rejected() {
    let mut data = minimal_data();
    data.diseases[0].treatments.push("missing".to_string());
    let err = KnowledgeBase::new(data).unwrap_err();
    assert!(matches!(
        err,
        KnowledgeError::DanglingTreatment { ref treatment, .. } if treatment == "missing"
    ));
}

#[test]
fn test_duplicate_id_rejected() {
    let mut data = minimal_data();
    let copy = data.diseases[0].clone();
    data.diseases.push(copy);
    let err = KnowledgeBase::new(data).unwrap_err();
    assert_eq!(err.code(), "duplicate_disease");
}

#[test]
fn test_severity_must_match_health() {
    let mut data = minimal_data();
    data.diseases
        .push(minimal_entry("corn_healthy", "corn", "healthy", Severity::Moderate));
    let err = KnowledgeBase::new(data).unwrap_err();
    assert_eq!(err.code(), "severity_mismatch");

    let mut data = minimal_data();
    data.diseases[0].severity = Severity::None;
    assert!(KnowledgeBase::new(data).is_err());
}

#[test]
fn test_id_must_match_tokens_and_names_non_empty() {
    let mut data = minimal_data();
    data.diseases[0].id = "corn_blight".to_string();
    assert_eq!(KnowledgeBase::new(data).unwrap_err().code(), "id_mismatch");

    let mut data = minimal_data();
    data.diseases[0].name = LocalizedText::new("  ");
    assert_eq!(KnowledgeBase::new(data).unwrap_err().code(), "empty_name");
}

#[test]
fn test_alias_target_must_exist() {
    let mut data = minimal_data();
    data.vocabulary.crop_aliases.push(Alias::new("tomate", "tomato"));
    assert_eq!(
        KnowledgeBase::new(data).unwrap_err().code(),
        "unknown_alias_target"
    );
}

#[test]
fn test_load_from_json_file() {
    let json = serde_json::to_string_pretty(&minimal_data()).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let kb = KnowledgeBase::load(file.path()).unwrap();
    assert_eq!(kb.disease("corn_rust").unwrap().name.primary(), "Maïs — rouille");
    assert!(kb.treatment("fungicide").is_some());
}

#[test]
fn test_load_reports_bad_json_and_missing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    assert_eq!(KnowledgeBase::load(file.path()).unwrap_err().code(), "json");

    let missing = std::path::Path::new("/nonexistent/agridetect/knowledge.json");
    assert_eq!(KnowledgeBase::load(missing).unwrap_err().code(), "io");
}

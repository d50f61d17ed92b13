//! Response composer: renders a catalog entry as chat text.
//!
//! Frame phrases live in a `Phrasebook` so each locale is data. Alternate
//! locales fall back to French wherever a phrase has no translation.

use crate::catalog::{Catalog, DiseaseEntry};
use crate::intent::rules::ResponseShape;
use crate::locale::{Language, LocalizedText};

/// Localized frame phrases. `{title}`, `{severity}`, `{text}` and `{crop}`
/// are substituted at render time.
#[derive(Debug, Clone)]
pub struct Phrasebook {
    pub treatment_title: LocalizedText,
    pub treatment_empty: LocalizedText,
    pub severity_line: LocalizedText,
    pub prevention_title: LocalizedText,
    pub prevention_empty: LocalizedText,
    pub symptoms: LocalizedText,
    pub symptoms_empty: LocalizedText,
    pub sheet_title: LocalizedText,
    pub sheet_severity: LocalizedText,
    pub sheet_symptoms: LocalizedText,
    pub sheet_treatments: LocalizedText,
    pub sheet_prevention: LocalizedText,
    pub crop_diseases_title: LocalizedText,
    pub crop_diseases_hint: LocalizedText,
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self {
            treatment_title: LocalizedText::new("Traitement pour **{title}** :"),
            treatment_empty: LocalizedText::new(
                "Pour **{title}**, pas de traitement spécifique enregistré.\n\
                 Supprime les parties atteintes et améliore l'aération.",
            ),
            severity_line: LocalizedText::new("\nSévérité : **{severity}**"),
            prevention_title: LocalizedText::new("Prévention pour **{title}** :"),
            prevention_empty: LocalizedText::new(
                "Prévention générale pour **{title}** :\n\
                 Rotation, arrosage au pied, enlever les feuilles malades.",
            ),
            symptoms: LocalizedText::new("Symptômes de **{title}** 🔍 :\n{text}"),
            symptoms_empty: LocalizedText::new(
                "Symptômes de **{title}** : taches sur feuilles et affaiblissement de la plante.",
            ),
            sheet_title: LocalizedText::new("📋 Maladie : **{title}**"),
            sheet_severity: LocalizedText::new("Sévérité : {severity}"),
            sheet_symptoms: LocalizedText::new("Symptômes : {text}"),
            sheet_treatments: LocalizedText::new("Traitements : {text}"),
            sheet_prevention: LocalizedText::new("Prévention : {text}"),
            crop_diseases_title: LocalizedText::new("Maladies courantes ({crop}) :"),
            crop_diseases_hint: LocalizedText::new("Demande par ex. « {text} » 👍"),
        }
    }
}

fn render(template: &LocalizedText, lang: Language, vars: &[(&str, &str)]) -> String {
    let mut out = template.get(lang).to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct Composer {
    catalog: Catalog,
    phrases: Phrasebook,
}

impl Composer {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_phrasebook(catalog, Phrasebook::default())
    }

    pub fn with_phrasebook(catalog: Catalog, phrases: Phrasebook) -> Self {
        Self { catalog, phrases }
    }

    /// Render `entry` in the requested shape.
    pub fn compose(&self, entry: &DiseaseEntry, shape: ResponseShape, lang: Language) -> String {
        match shape {
            ResponseShape::Treatment => self.treatment(entry, lang),
            ResponseShape::Prevention => self.prevention(entry, lang),
            ResponseShape::Symptoms => self.symptoms(entry, lang),
            ResponseShape::FactSheet => self.fact_sheet(entry, lang),
        }
    }

    fn treatment(&self, entry: &DiseaseEntry, lang: Language) -> String {
        let p = &self.phrases;
        let title = entry.name.get(lang);
        let treatments = self.catalog.treatments_for(entry);
        if treatments.is_empty() {
            return render(&p.treatment_empty, lang, &[("title", title)]);
        }

        let mut lines = vec![render(&p.treatment_title, lang, &[("title", title)])];
        for t in treatments {
            lines.push(format!(
                "  • {} : {} ({})",
                t.name, t.description, t.application
            ));
        }
        lines.push(render(
            &p.severity_line,
            lang,
            &[("severity", entry.severity.label())],
        ));
        lines.join("\n")
    }

    fn prevention(&self, entry: &DiseaseEntry, lang: Language) -> String {
        let p = &self.phrases;
        let title = entry.name.get(lang);
        if entry.prevention.is_empty() {
            return render(&p.prevention_empty, lang, &[("title", title)]);
        }

        let mut lines = vec![render(&p.prevention_title, lang, &[("title", title)])];
        lines.extend(entry.prevention.iter().map(|tip| format!("  • {}", tip)));
        lines.join("\n")
    }

    fn symptoms(&self, entry: &DiseaseEntry, lang: Language) -> String {
        let p = &self.phrases;
        let title = entry.name.get(lang);
        match entry.symptoms.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                render(&p.symptoms, lang, &[("title", title), ("text", text)])
            }
            _ => render(&p.symptoms_empty, lang, &[("title", title)]),
        }
    }

    /// Severity, symptoms, at most two treatments and two prevention tips.
    fn fact_sheet(&self, entry: &DiseaseEntry, lang: Language) -> String {
        let p = &self.phrases;
        let mut parts = vec![
            render(&p.sheet_title, lang, &[("title", entry.name.get(lang))]),
            render(
                &p.sheet_severity,
                lang,
                &[("severity", entry.severity.label())],
            ),
        ];

        if let Some(symptoms) = entry.symptoms.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(render(&p.sheet_symptoms, lang, &[("text", symptoms)]));
        }

        let treatments: Vec<&str> = self
            .catalog
            .treatments_for(entry)
            .into_iter()
            .take(2)
            .map(|t| t.name.as_str())
            .collect();
        if !treatments.is_empty() {
            let joined = treatments.join("; ");
            parts.push(render(&p.sheet_treatments, lang, &[("text", joined.as_str())]));
        }

        if !entry.prevention.is_empty() {
            let joined = entry
                .prevention
                .iter()
                .take(2)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            parts.push(render(&p.sheet_prevention, lang, &[("text", joined.as_str())]));
        }

        parts.join("\n")
    }

    /// Conditions recorded for a crop, healthy state excluded.
    pub fn crop_diseases(&self, crop_token: &str, lang: Language) -> String {
        let p = &self.phrases;
        let entries: Vec<&DiseaseEntry> = self
            .catalog
            .all_entries()
            .iter()
            .filter(|e| e.crop == crop_token && !e.is_healthy())
            .collect();

        let crop_name = match entries.first() {
            Some(e) => e.crop_name.get(lang).to_string(),
            None => crop_token.to_string(),
        };

        let mut lines = vec![render(&p.crop_diseases_title, lang, &[("crop", crop_name.as_str())])];
        for e in &entries {
            lines.push(format!("- {}", capitalize(e.condition_name.get(lang))));
        }
        if let Some(first) = entries.first() {
            let example = format!(
                "traitement {} {}",
                first.condition_name.primary().to_lowercase(),
                first.crop_name.primary().to_lowercase()
            );
            lines.push(render(&p.crop_diseases_hint, lang, &[("text", example.as_str())]));
        }
        lines.join("\n")
    }
}

//! Chat rule tables.
//!
//! Two ordered tables: disease rules pick a response shape once a catalog
//! entry is resolved, topic rules answer everything else. The first rule
//! whose trigger fires wins. Keywords are plain text; the resolver
//! normalizes them the same way it normalizes messages.

use crate::locale::LocalizedText;
use serde::{Deserialize, Serialize};

/// When a rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "keywords")]
pub enum Trigger {
    /// Any of the phrases appears as whole words
    AnyOf(Vec<String>),
    /// A crop alias and any of the phrases both appear
    CropWith(Vec<String>),
    /// Unconditional fallback
    Always,
}

/// Shape of a disease-specific answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    Treatment,
    Prevention,
    Symptoms,
    FactSheet,
}

/// Generic conversation topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FungalPrevention,
    BiologicalTreatment,
    Watering,
    GeneralPrevention,
    CropDiseases,
    Default,
}

/// How a topic rule produces its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicReply {
    Fixed(LocalizedText),
    /// List of the mentioned crop's conditions, built from the catalog
    CropDiseaseList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRule {
    pub trigger: Trigger,
    pub shape: ResponseShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRule {
    pub trigger: Trigger,
    pub topic: Topic,
    pub reply: TopicReply,
}

/// Everything the resolver needs besides the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub disease_rules: Vec<DiseaseRule>,
    pub topic_rules: Vec<TopicRule>,
    /// Function words ignored when counting name tokens
    pub stopwords: Vec<String>,
    /// Example queries attached to every answer
    pub suggestions: Vec<String>,
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn any_of(items: &[&str]) -> Trigger {
    Trigger::AnyOf(phrases(items))
}

impl RuleSet {
    pub fn builtin() -> Self {
        Self {
            disease_rules: vec![
                DiseaseRule {
                    trigger: any_of(&[
                        "traitement",
                        "traitements",
                        "traiter",
                        "soigner",
                        "soin",
                        "remède",
                        "remèdes",
                        "treatment",
                        "treat",
                        "cure",
                    ]),
                    shape: ResponseShape::Treatment,
                },
                DiseaseRule {
                    trigger: any_of(&[
                        "prévention",
                        "prevention",
                        "prévenir",
                        "éviter",
                        "eviter",
                        "protéger",
                        "prevent",
                    ]),
                    shape: ResponseShape::Prevention,
                },
                DiseaseRule {
                    trigger: any_of(&[
                        "symptôme",
                        "symptômes",
                        "symptome",
                        "symptomes",
                        "reconnaître",
                        "reconnaitre",
                        "signes",
                        "symptom",
                        "symptoms",
                    ]),
                    shape: ResponseShape::Symptoms,
                },
                DiseaseRule {
                    trigger: Trigger::Always,
                    shape: ResponseShape::FactSheet,
                },
            ],
            topic_rules: vec![
                TopicRule {
                    trigger: any_of(&[
                        "maladie fongique",
                        "maladies fongiques",
                        "fongique",
                        "fongiques",
                        "champignon",
                        "champignons",
                    ]),
                    topic: Topic::FungalPrevention,
                    reply: TopicReply::Fixed(LocalizedText::new(
                        "Pour prévenir les maladies fongiques 🌿 :\n\
                         1. Arroser au pied (pas sur les feuilles)\n\
                         2. Espacer les plants pour que ça sèche vite\n\
                         3. Pailler le sol pour éviter les éclaboussures\n\
                         4. Enlever les feuilles touchées et les sortir de la parcelle\n\
                         5. Faire une rotation des cultures\n\
                         6. En saison humide : surveiller souvent pour traiter tôt (cuivre/soufre si autorisé).",
                    )),
                },
                TopicRule {
                    trigger: any_of(&[
                        "traitement biologique",
                        "traitements biologiques",
                        "biologique",
                        "biologiques",
                        "bio",
                    ]),
                    topic: Topic::BiologicalTreatment,
                    reply: TopicReply::Fixed(LocalizedText::new(
                        "Traitements biologiques possibles 🌱 :\n\
                         - Savon noir dilué (insectes, acariens)\n\
                         - Huile de Neem (le soir, éviter fleurs ouvertes)\n\
                         - Décoction d'ail ou de neem en prévention\n\
                         - Cuivre/bouillie bordelaise (selon les autorisations locales)\n\
                         - Toujours traiter le matin ou le soir.",
                    )),
                },
                TopicRule {
                    trigger: any_of(&["arrosage", "arrosages", "arroser", "arrose", "irrigation"]),
                    topic: Topic::Watering,
                    reply: TopicReply::Fixed(LocalizedText::new(
                        "Bonnes pratiques d'arrosage 💧 :\n\
                         1. Arroser au pied, pas sur les feuilles\n\
                         2. Le matin (ou le soir s'il fait très chaud)\n\
                         3. Garder le sol humide mais non détrempé\n\
                         4. Pailler pour réduire l'évaporation ✅",
                    )),
                },
                TopicRule {
                    trigger: any_of(&[
                        "prévention",
                        "prevention",
                        "éviter maladie",
                        "éviter",
                        "eviter",
                        "prévenir",
                        "protéger",
                    ]),
                    topic: Topic::GeneralPrevention,
                    reply: TopicReply::Fixed(LocalizedText::new(
                        "Prévention générale des maladies 🛡️ :\n\
                         - Utiliser des semences/plants sains\n\
                         - Espacer les plants pour l'aération\n\
                         - Arroser au pied\n\
                         - Retirer les feuilles malades\n\
                         - Pratiquer la rotation des cultures",
                    )),
                },
                TopicRule {
                    trigger: Trigger::CropWith(phrases(&[
                        "maladie", "maladies", "disease", "diseases",
                    ])),
                    topic: Topic::CropDiseases,
                    reply: TopicReply::CropDiseaseList,
                },
                TopicRule {
                    trigger: Trigger::Always,
                    topic: Topic::Default,
                    reply: TopicReply::Fixed(LocalizedText::new(
                        "Je n'ai pas trouvé exactement la maladie dans ton message 😅.\n\
                         Tu peux écrire :\n\
                         - « traitement mildiou tomate »\n\
                         - « prévention tache bactérienne poivron »\n\
                         - « symptômes brûlure précoce pomme de terre »\n\
                         - « bonnes pratiques d'arrosage »",
                    )),
                },
            ],
            stopwords: phrases(&[
                "de", "la", "le", "les", "des", "du", "d", "l", "et", "en", "a", "au", "aux", "un",
                "une", "the", "of", "and",
            ]),
            suggestions: phrases(&[
                "traitement mildiou tomate",
                "prévention tache bactérienne poivron",
                "bonnes pratiques d'arrosage",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_end_with_fallback() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.disease_rules.last().unwrap().trigger, Trigger::Always);
        assert_eq!(rules.topic_rules.last().unwrap().topic, Topic::Default);
        assert_eq!(rules.topic_rules.last().unwrap().trigger, Trigger::Always);
    }

    #[test]
    fn test_disease_priority_order() {
        let shapes: Vec<ResponseShape> = RuleSet::builtin()
            .disease_rules
            .iter()
            .map(|r| r.shape)
            .collect();
        assert_eq!(
            shapes,
            vec![
                ResponseShape::Treatment,
                ResponseShape::Prevention,
                ResponseShape::Symptoms,
                ResponseShape::FactSheet,
            ]
        );
    }

    #[test]
    fn test_topic_priority_order() {
        let topics: Vec<Topic> = RuleSet::builtin()
            .topic_rules
            .iter()
            .map(|r| r.topic)
            .collect();
        assert_eq!(
            topics,
            vec![
                Topic::FungalPrevention,
                Topic::BiologicalTreatment,
                Topic::Watering,
                Topic::GeneralPrevention,
                Topic::CropDiseases,
                Topic::Default,
            ]
        );
    }
}

//! Built-in knowledge tables: three crops, fifteen conditions.
//!
//! Catalog order is significant. Matching ties are broken by it.

use super::{Alias, KnowledgeData, LabelAlias, Vocabulary};
use crate::catalog::{DiseaseEntry, Severity, TreatmentEntry};
use crate::locale::LocalizedText;

pub(super) fn data() -> KnowledgeData {
    KnowledgeData {
        diseases: diseases(),
        treatments: treatments(),
        vocabulary: vocabulary(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pepper() -> LocalizedText {
    LocalizedText::tri("Piment", "Pimó", "Piment")
}

fn potato() -> LocalizedText {
    LocalizedText::tri("Pomme de terre", "Pomme de terre", "Pomme de terre")
}

fn tomato() -> LocalizedText {
    LocalizedText::tri("Tomate", "Tomaat", "Tomate")
}

fn diseases() -> Vec<DiseaseEntry> {
    vec![
        // Pepper
        DiseaseEntry {
            id: "pepper_bacterial_spot".into(),
            crop: "pepper".into(),
            condition: "bacterial_spot".into(),
            crop_name: pepper(),
            condition_name: LocalizedText::tri(
                "tache bactérienne",
                "tàkk bakteriya",
                "tache bakteriya",
            ),
            name: LocalizedText::tri(
                "Piment — tache bactérienne",
                "Pimó — tàkk bakteriya",
                "Piment tache bakteriya",
            ),
            condition_en: "Bacterial spot".into(),
            severity: Severity::Moderate,
            symptoms: Some(
                "Petites taches brun-noir, parfois entourées de jaune, sur feuilles et parfois fruits."
                    .into(),
            ),
            treatments: strings(&["copper_spray", "crop_rotation"]),
            prevention: strings(&[
                "Semences/plants sains",
                "Désinfection des outils",
                "Éviter de manipuler les plantes mouillées",
            ]),
        },
        DiseaseEntry {
            id: "pepper_healthy".into(),
            crop: "pepper".into(),
            condition: "healthy".into(),
            crop_name: pepper(),
            condition_name: LocalizedText::tri("sain", "wér", "cellal"),
            name: LocalizedText::tri("Piment sain", "Pimó wér", "Piment cellal"),
            condition_en: "Healthy".into(),
            severity: Severity::None,
            symptoms: None,
            treatments: Vec::new(),
            prevention: strings(&["Surveillance régulière", "Arrosage au pied"]),
        },
        // Potato
        DiseaseEntry {
            id: "potato_early_blight".into(),
            crop: "potato".into(),
            condition: "early_blight".into(),
            crop_name: potato(),
            condition_name: LocalizedText::tri("alternariose", "ñawu weñ", "early blight"),
            name: LocalizedText::tri(
                "Pomme de terre — alternariose",
                "Ñawu weñ (pomme de terre)",
                "Early blight",
            ),
            condition_en: "Early blight".into(),
            severity: Severity::Moderate,
            symptoms: Some("Taches brunes avec cercles concentriques sur les feuilles âgées.".into()),
            treatments: strings(&["fungicide_copper", "neem_oil"]),
            prevention: strings(&[
                "Rotation 2 à 3 ans",
                "Éviter excès d'azote",
                "Espacer les plants pour l'aération",
            ]),
        },
        DiseaseEntry {
            id: "potato_late_blight".into(),
            crop: "potato".into(),
            condition: "late_blight".into(),
            crop_name: potato(),
            condition_name: LocalizedText::tri("mildiou", "mildiou", "late blight"),
            name: LocalizedText::tri("Pomme de terre — mildiou", "Mildiou", "Late blight"),
            condition_en: "Late blight".into(),
            severity: Severity::High,
            symptoms: Some(
                "Taches brun-gris s'élargissant vite, parfois duvet blanc au revers.".into(),
            ),
            treatments: strings(&["fungicide_systemic", "remove_infected"]),
            prevention: strings(&[
                "Arroser au pied",
                "Éviter l'humidité prolongée sur le feuillage",
                "Utiliser des variétés tolérantes quand c'est possible",
            ]),
        },
        DiseaseEntry {
            id: "potato_healthy".into(),
            crop: "potato".into(),
            condition: "healthy".into(),
            crop_name: potato(),
            condition_name: LocalizedText::tri("saine", "wér", "cellal"),
            name: LocalizedText::tri(
                "Pomme de terre saine",
                "Pomme de terre wér",
                "Pomme de terre cellal",
            ),
            condition_en: "Healthy".into(),
            severity: Severity::None,
            symptoms: None,
            treatments: Vec::new(),
            prevention: strings(&["Surveillance", "Arrosage régulier sans détremper le sol"]),
        },
        // Tomato
        DiseaseEntry {
            id: "tomato_bacterial_spot".into(),
            crop: "tomato".into(),
            condition: "bacterial_spot".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri(
                "tache bactérienne",
                "tàkk bakteriya",
                "tache bakteriya",
            ),
            name: LocalizedText::tri(
                "Tomate — tache bactérienne",
                "Tomaat — tàkk bakteriya",
                "Tomate tache bakteriya",
            ),
            condition_en: "Bacterial spot".into(),
            severity: Severity::Moderate,
            symptoms: Some("Petites taches sombres, parfois huileuses, sur feuilles et fruits.".into()),
            treatments: strings(&["copper_spray", "remove_infected"]),
            prevention: strings(&[
                "Semences certifiées",
                "Désinfecter les outils",
                "Éviter les éclaboussures d'eau",
            ]),
        },
        DiseaseEntry {
            id: "tomato_early_blight".into(),
            crop: "tomato".into(),
            condition: "early_blight".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("alternariose", "ñawu weñ", "early blight"),
            name: LocalizedText::tri("Tomate — alternariose", "Ñawu weñ (tomate)", "Early blight"),
            condition_en: "Early blight".into(),
            severity: Severity::Moderate,
            symptoms: Some("Taches brunes avec anneaux concentriques sur feuilles âgées.".into()),
            treatments: strings(&["fungicide_copper", "neem_oil"]),
            prevention: strings(&[
                "Rotation",
                "Ne pas mouiller le feuillage le soir",
                "Ramasser les débris au sol",
            ]),
        },
        DiseaseEntry {
            id: "tomato_late_blight".into(),
            crop: "tomato".into(),
            condition: "late_blight".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("mildiou", "mildiou", "late blight"),
            name: LocalizedText::tri("Tomate — mildiou", "Mildiou", "Late blight"),
            condition_en: "Late blight".into(),
            severity: Severity::High,
            symptoms: Some(
                "Taches brun-gris qui s'élargissent vite, parfois duvet blanc au revers.".into(),
            ),
            treatments: strings(&["fungicide_systemic", "remove_infected"]),
            prevention: strings(&[
                "Arroser au pied",
                "Espacer les plants",
                "Éviter l'humidité prolongée",
            ]),
        },
        DiseaseEntry {
            id: "tomato_leaf_mold".into(),
            crop: "tomato".into(),
            condition: "leaf_mold".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("feutrage", "puur weex", "huɗo peewo"),
            name: LocalizedText::tri("Tomate — feutrage", "Puur weex", "Huɗo peewo"),
            condition_en: "Leaf mold".into(),
            severity: Severity::Moderate,
            symptoms: Some("Tache jaune en dessus, feutrage olive en dessous.".into()),
            treatments: strings(&["sulfur_spray", "copper_spray"]),
            prevention: strings(&["Bonne ventilation", "Éviter condensation dans les abris"]),
        },
        DiseaseEntry {
            id: "tomato_septoria_leaf_spot".into(),
            crop: "tomato".into(),
            condition: "septoria_leaf_spot".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("septoriose", "septoria", "septoria"),
            name: LocalizedText::tri("Tomate — septoriose", "Septoria", "Septoria"),
            condition_en: "Septoria leaf spot".into(),
            severity: Severity::Moderate,
            symptoms: Some("Petites taches rondes à centre clair et bord foncé.".into()),
            treatments: strings(&["copper_spray", "neem_oil"]),
            prevention: strings(&["Rotation", "Arrosage au pied", "Paillage"]),
        },
        DiseaseEntry {
            id: "tomato_spider_mites".into(),
            crop: "tomato".into(),
            condition: "spider_mites".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("araignées rouges", "xajj", "kooke"),
            name: LocalizedText::tri("Tomate — araignées rouges", "Xajj", "Kooke"),
            condition_en: "Spider mites (Two-spotted spider mite)".into(),
            severity: Severity::Moderate,
            symptoms: Some("Feuilles décolorées, fines toiles, petits points jaunes.".into()),
            treatments: strings(&["neem_oil", "soap_solution"]),
            prevention: strings(&["Éviter le stress hydrique", "Surveiller le revers des feuilles"]),
        },
        DiseaseEntry {
            id: "tomato_target_spot".into(),
            crop: "tomato".into(),
            condition: "target_spot".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("tache en cible", "tàkk bu dalal", "target spot"),
            name: LocalizedText::tri("Tomate — tache en cible", "Tàkk bu dalal", "Target spot"),
            condition_en: "Target spot".into(),
            severity: Severity::Moderate,
            symptoms: Some("Taches rondes avec cercles concentriques.".into()),
            treatments: strings(&["copper_spray"]),
            prevention: strings(&["Aérer", "Éviter excès d'azote"]),
        },
        DiseaseEntry {
            id: "tomato_mosaic_virus".into(),
            crop: "tomato".into(),
            condition: "mosaic_virus".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri(
                "virus de la mosaïque",
                "wirùs mosayik",
                "virus mosaïque",
            ),
            name: LocalizedText::tri(
                "Tomate — virus de la mosaïque",
                "Wirùs mosayik",
                "Virus mosaïque",
            ),
            condition_en: "Tomato mosaic virus".into(),
            severity: Severity::High,
            symptoms: Some(
                "Feuilles marbrées vert clair/vert foncé, déformation éventuelle.".into(),
            ),
            treatments: strings(&["remove_infected", "insecticide_vectors"]),
            prevention: strings(&[
                "Semences saines",
                "Désinfection des outils",
                "Contrôler les vecteurs (pucerons, aleurodes)",
            ]),
        },
        DiseaseEntry {
            id: "tomato_yellow_leaf_curl_virus".into(),
            crop: "tomato".into(),
            condition: "yellow_leaf_curl_virus".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("enroulement jaune (TYLCV)", "TYLCV", "TYLCV"),
            name: LocalizedText::tri("Tomate — TYLCV", "TYLCV", "TYLCV"),
            condition_en: "Tomato yellow leaf curl virus".into(),
            severity: Severity::High,
            symptoms: Some("Feuilles jaunes enroulées vers le haut, pousse ralentie.".into()),
            treatments: strings(&["insecticide_vectors", "remove_infected"]),
            prevention: strings(&["Filets anti-insectes", "Paillage", "Variétés tolérantes"]),
        },
        DiseaseEntry {
            id: "tomato_healthy".into(),
            crop: "tomato".into(),
            condition: "healthy".into(),
            crop_name: tomato(),
            condition_name: LocalizedText::tri("saine", "wér", "cellal"),
            name: LocalizedText::tri("Tomate saine", "Tomaat wér", "Tomate cellal"),
            condition_en: "Healthy".into(),
            severity: Severity::None,
            symptoms: None,
            treatments: Vec::new(),
            prevention: strings(&["Surveillance régulière", "Bonne irrigation"]),
        },
    ]
}

fn treatment(
    id: &str,
    name: &str,
    description: &str,
    application: &str,
    organic: bool,
) -> TreatmentEntry {
    TreatmentEntry {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        application: application.into(),
        organic,
    }
}

fn treatments() -> Vec<TreatmentEntry> {
    vec![
        treatment(
            "fungicide_copper",
            "Bouillie bordelaise",
            "Fongicide à base de cuivre",
            "Tous les 7–10 jours",
            true,
        ),
        treatment(
            "copper_spray",
            "Cuivre (hydroxyde/oxychlorure)",
            "Antibactérien / fongique",
            "Suivre l'étiquette",
            true,
        ),
        treatment(
            "fungicide_systemic",
            "Fongicide systémique",
            "Curatif homologué",
            "Suivre l'étiquette",
            false,
        ),
        treatment(
            "neem_oil",
            "Huile de Neem",
            "Insecticide/fongique bio",
            "Hebdomadaire, le soir",
            true,
        ),
        treatment(
            "sulfur_spray",
            "Soufre",
            "Oïdium / feutrage",
            "Pulvérisation foliaire",
            true,
        ),
        treatment(
            "soap_solution",
            "Savon noir dilué",
            "Acariens / pucerons",
            "Soir, rincer après 24h",
            true,
        ),
        treatment(
            "remove_infected",
            "Arrachage des plants atteints",
            "Limiter la propagation",
            "Évacuer hors de la parcelle",
            true,
        ),
        treatment(
            "insecticide_vectors",
            "Contrôle des vecteurs",
            "Aleurodes / pucerons",
            "Pièges + produit homologué",
            false,
        ),
        treatment(
            "crop_rotation",
            "Rotation des cultures",
            "Brise les cycles des pathogènes",
            "Tous les 2–3 saisons",
            true,
        ),
    ]
}

fn aliases(token: &str, texts: &[&str]) -> Vec<Alias> {
    texts.iter().map(|t| Alias::new(*t, token)).collect()
}

fn vocabulary() -> Vocabulary {
    let crop_aliases = [
        aliases("tomato", &["tomate", "tomates", "tomato", "tomatoes", "tomaat"]),
        aliases(
            "potato",
            &[
                "pomme de terre",
                "pommes de terre",
                "potato",
                "potatoes",
                "patate",
                "patates",
            ],
        ),
        aliases(
            "pepper",
            &[
                "poivron", "poivrons", "piment", "piments", "pepper", "peppers", "pimó",
            ],
        ),
    ]
    .concat();

    let condition_aliases = [
        aliases(
            "bacterial_spot",
            &[
                "tache bactérienne",
                "taches bactériennes",
                "bacterial spot",
                "tàkk bakteriya",
                "tache bakteriya",
            ],
        ),
        aliases("late_blight", &["mildiou", "brûlure tardive", "late blight"]),
        aliases(
            "early_blight",
            &["brûlure précoce", "alternariose", "early blight", "ñawu weñ"],
        ),
        aliases(
            "leaf_mold",
            &["moisissure", "moisissures", "feutrage", "leaf mold", "puur weex"],
        ),
        aliases(
            "septoria_leaf_spot",
            &["septoriose", "septoria", "tache foliaire"],
        ),
        aliases(
            "spider_mites",
            &[
                "acariens",
                "acarien",
                "araignées rouges",
                "araignée rouge",
                "tétranyque",
                "tétranyques",
                "spider mites",
                "xajj",
                "kooke",
            ],
        ),
        aliases(
            "target_spot",
            &["tache cible", "tache en cible", "target spot", "tàkk bu dalal"],
        ),
        aliases(
            "mosaic_virus",
            &["mosaïque", "virus mosaïque", "mosaic", "mosaic virus", "mosayik"],
        ),
        aliases(
            "yellow_leaf_curl_virus",
            &["enroulement jaune", "tylcv", "yellow leaf curl"],
        ),
        aliases(
            "healthy",
            &["sain", "saine", "sains", "saines", "healthy", "wér", "cellal"],
        ),
    ]
    .concat();

    let label_aliases: Vec<LabelAlias> = CLASS_LABELS
        .iter()
        .map(|(label, id)| LabelAlias {
            label: label.to_string(),
            id: id.to_string(),
        })
        .collect();

    Vocabulary {
        crop_aliases,
        condition_aliases,
        label_aliases,
        class_labels: CLASS_LABELS.iter().map(|(l, _)| l.to_string()).collect(),
    }
}

/// Dataset labels in classifier output order, with their catalog ids.
const CLASS_LABELS: [(&str, &str); 15] = [
    ("Pepper__bell___Bacterial_spot", "pepper_bacterial_spot"),
    ("Pepper__bell___healthy", "pepper_healthy"),
    ("Potato___Early_blight", "potato_early_blight"),
    ("Potato___Late_blight", "potato_late_blight"),
    ("Potato___healthy", "potato_healthy"),
    ("Tomato_Bacterial_spot", "tomato_bacterial_spot"),
    ("Tomato_Early_blight", "tomato_early_blight"),
    ("Tomato_Late_blight", "tomato_late_blight"),
    ("Tomato_Leaf_Mold", "tomato_leaf_mold"),
    ("Tomato_Septoria_leaf_spot", "tomato_septoria_leaf_spot"),
    (
        "Tomato_Spider_mites_Two_spotted_spider_mite",
        "tomato_spider_mites",
    ),
    ("Tomato__Target_Spot", "tomato_target_spot"),
    (
        "Tomato__Tomato_YellowLeaf__Curl_Virus",
        "tomato_yellow_leaf_curl_virus",
    ),
    ("Tomato__Tomato_mosaic_virus", "tomato_mosaic_virus"),
    ("Tomato_healthy", "tomato_healthy"),
];

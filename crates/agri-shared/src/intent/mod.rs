//! Chat intent resolver.
//!
//! Turns a free-text message into a reply. A catalog entry is looked for
//! first (paired crop + condition aliases, then name tokens, then verbatim
//! names); if one resolves, the disease rule table picks the answer shape,
//! otherwise the topic rule table answers. Total and deterministic: every
//! input gets a non-empty reply.

pub mod rules;

use crate::catalog::{Catalog, DiseaseEntry};
use crate::composer::Composer;
use crate::knowledge::{Alias, KnowledgeBase};
use crate::locale::Language;
use crate::normalize::{contains_phrase, normalize_message, words};
use rules::{DiseaseRule, ResponseShape, RuleSet, Topic, TopicReply, TopicRule, Trigger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Intent tag returned with every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIntent {
    DiseaseInfo,
    General,
}

impl std::fmt::Display for ChatIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DiseaseInfo => "disease_info",
            Self::General => "general",
        };
        write!(f, "{}", s)
    }
}

/// Which template produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    TreatmentResponse,
    PreventionResponse,
    SymptomResponse,
    GenericFactsheet,
    GenericTopicResponse,
    DefaultResponse,
}

impl From<ResponseShape> for TemplateKind {
    fn from(shape: ResponseShape) -> Self {
        match shape {
            ResponseShape::Treatment => Self::TreatmentResponse,
            ResponseShape::Prevention => Self::PreventionResponse,
            ResponseShape::Symptoms => Self::SymptomResponse,
            ResponseShape::FactSheet => Self::GenericFactsheet,
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TreatmentResponse => "treatment_response",
            Self::PreventionResponse => "prevention_response",
            Self::SymptomResponse => "symptom_response",
            Self::GenericFactsheet => "generic_factsheet",
            Self::GenericTopicResponse => "generic_topic_response",
            Self::DefaultResponse => "default_response",
        };
        write!(f, "{}", s)
    }
}

/// Disease-key detection stage that found the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Paired,
    MultiToken,
    Substring,
}

/// Result of resolving one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub text: String,
    pub intent: ChatIntent,
    pub template: TemplateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchStage>,
    pub language: Language,
    pub suggestions: Vec<String>,
}

type Phrase = Vec<String>;

#[derive(Debug, Clone)]
enum Compiled {
    AnyOf(Vec<Phrase>),
    CropWith(Vec<Phrase>),
    Always,
}

#[derive(Debug, Clone)]
struct AliasPhrase {
    phrase: Phrase,
    token: String,
}

/// One searchable text of an entry: its display name or its crop name.
#[derive(Debug, Clone)]
struct IndexText {
    entry: usize,
    full: String,
    tokens: Vec<String>,
}

/// Outcome of evaluating a trigger.
enum Fired<'a> {
    Plain,
    Crop(&'a str),
}

#[derive(Debug, Clone)]
pub struct Resolver {
    kb: Arc<KnowledgeBase>,
    composer: Composer,
    rules: RuleSet,
    fold_accents: bool,
    crop_aliases: Vec<AliasPhrase>,
    condition_aliases: Vec<AliasPhrase>,
    index: Vec<IndexText>,
    disease_triggers: Vec<Compiled>,
    topic_triggers: Vec<Compiled>,
}

impl Resolver {
    /// Compile `rules` against the knowledge base. Keywords, aliases and
    /// indexed names go through the same normalization as messages.
    pub fn new(kb: Arc<KnowledgeBase>, rules: RuleSet, fold_accents: bool) -> Self {
        let fold = fold_accents;
        let stopwords: Vec<String> = rules
            .stopwords
            .iter()
            .map(|s| normalize_message(s, fold))
            .collect();

        let mut index = Vec::new();
        for (i, entry) in kb.diseases().iter().enumerate() {
            for text in [entry.name.primary(), entry.crop_name.primary()] {
                let full = normalize_message(text, fold);
                let mut tokens: Vec<String> = Vec::new();
                for w in words(&full) {
                    if !stopwords.iter().any(|s| s == w) && !tokens.iter().any(|t| t == w) {
                        tokens.push(w.to_string());
                    }
                }
                if !full.is_empty() && !tokens.is_empty() {
                    index.push(IndexText {
                        entry: i,
                        full,
                        tokens,
                    });
                }
            }
        }

        let vocab = kb.vocabulary();
        let crop_aliases = alias_phrases(&vocab.crop_aliases, fold);
        let condition_aliases = alias_phrases(&vocab.condition_aliases, fold);
        let disease_triggers = rules
            .disease_rules
            .iter()
            .map(|r| compile(&r.trigger, fold))
            .collect();
        let topic_triggers = rules
            .topic_rules
            .iter()
            .map(|r| compile(&r.trigger, fold))
            .collect();
        let composer = Composer::new(Catalog::new(kb.clone()));

        Self {
            kb,
            composer,
            rules,
            fold_accents,
            crop_aliases,
            condition_aliases,
            index,
            disease_triggers,
            topic_triggers,
        }
    }

    /// Resolver over the built-in rule tables.
    pub fn with_builtin_rules(kb: Arc<KnowledgeBase>, fold_accents: bool) -> Self {
        Self::new(kb, RuleSet::builtin(), fold_accents)
    }

    /// Disease rules in priority order.
    pub fn disease_rules(&self) -> &[DiseaseRule] {
        &self.rules.disease_rules
    }

    /// Topic rules in priority order.
    pub fn topic_rules(&self) -> &[TopicRule] {
        &self.rules.topic_rules
    }

    pub fn suggestions(&self) -> &[String] {
        &self.rules.suggestions
    }

    /// Produce a reply for `message`.
    ///
    /// The multi-token stage counts whole words only: a name token that
    /// occurs inside a longer message word ("sain" in "saine") is not a hit,
    /// and stopwords ("de", "la", ...) are never tokens.
    pub fn resolve(&self, message: &str, lang: Language) -> Resolution {
        let normalized = normalize_message(message, self.fold_accents);
        let msg_words = words(&normalized);

        let resolution = match self.detect_disease(&normalized, &msg_words) {
            Some((entry, stage)) => self.disease_reply(entry, stage, &msg_words, lang),
            None => self.topic_reply(&msg_words, lang),
        };

        debug!(
            "Resolved message: intent={} template={} disease={:?}",
            resolution.intent, resolution.template, resolution.disease_id
        );
        resolution
    }

    /// Find the catalog entry a message is about, if any.
    pub fn detect(&self, message: &str) -> Option<(&DiseaseEntry, MatchStage)> {
        let normalized = normalize_message(message, self.fold_accents);
        let msg_words = words(&normalized);
        self.detect_disease(&normalized, &msg_words)
    }

    fn detect_disease(
        &self,
        normalized: &str,
        msg_words: &[&str],
    ) -> Option<(&DiseaseEntry, MatchStage)> {
        if let Some(entry) = self.paired_match(msg_words) {
            return Some((entry, MatchStage::Paired));
        }

        // At least min(2, n) of an indexed text's tokens appear as words.
        if let Some(hit) = self.index.iter().find(|t| {
            let present = t
                .tokens
                .iter()
                .filter(|tok| msg_words.contains(&tok.as_str()))
                .count();
            present >= t.tokens.len().min(2)
        }) {
            return Some((&self.kb.diseases()[hit.entry], MatchStage::MultiToken));
        }

        self.index
            .iter()
            .find(|t| normalized.contains(t.full.as_str()))
            .map(|hit| (&self.kb.diseases()[hit.entry], MatchStage::Substring))
    }

    fn paired_match(&self, msg_words: &[&str]) -> Option<&DiseaseEntry> {
        for crop in self
            .crop_aliases
            .iter()
            .filter(|a| contains_phrase(msg_words, &a.phrase))
        {
            for condition in self
                .condition_aliases
                .iter()
                .filter(|a| contains_phrase(msg_words, &a.phrase))
            {
                if let Some(entry) = self
                    .kb
                    .diseases()
                    .iter()
                    .find(|e| e.crop == crop.token && e.condition == condition.token)
                {
                    return Some(entry);
                }
            }
        }
        None
    }

    fn mentioned_crop(&self, msg_words: &[&str]) -> Option<&str> {
        self.crop_aliases
            .iter()
            .find(|a| contains_phrase(msg_words, &a.phrase))
            .map(|a| a.token.as_str())
    }

    fn fires<'a>(&'a self, trigger: &Compiled, msg_words: &[&str]) -> Option<Fired<'a>> {
        let any = |list: &[Phrase]| list.iter().any(|p| contains_phrase(msg_words, p));
        match trigger {
            Compiled::Always => Some(Fired::Plain),
            Compiled::AnyOf(list) => any(list.as_slice()).then_some(Fired::Plain),
            Compiled::CropWith(list) => {
                if !any(list.as_slice()) {
                    return None;
                }
                self.mentioned_crop(msg_words).map(Fired::Crop)
            }
        }
    }

    fn disease_reply(
        &self,
        entry: &DiseaseEntry,
        stage: MatchStage,
        msg_words: &[&str],
        lang: Language,
    ) -> Resolution {
        let shape = self
            .rules
            .disease_rules
            .iter()
            .zip(&self.disease_triggers)
            .find(|(_, trigger)| self.fires(trigger, msg_words).is_some())
            .map(|(rule, _)| rule.shape)
            .unwrap_or(ResponseShape::FactSheet);

        Resolution {
            text: self.composer.compose(entry, shape, lang),
            intent: ChatIntent::DiseaseInfo,
            template: shape.into(),
            topic: None,
            disease_id: Some(entry.id.clone()),
            matched_by: Some(stage),
            language: lang,
            suggestions: self.rules.suggestions.clone(),
        }
    }

    fn topic_reply(&self, msg_words: &[&str], lang: Language) -> Resolution {
        let found = self
            .rules
            .topic_rules
            .iter()
            .zip(&self.topic_triggers)
            .find_map(|(rule, trigger)| self.fires(trigger, msg_words).map(|f| (rule, f)));

        let (topic, text) = match found {
            Some((rule, fired)) => {
                let text = match (&rule.reply, fired) {
                    (TopicReply::Fixed(text), _) => text.get(lang).to_string(),
                    (TopicReply::CropDiseaseList, Fired::Crop(token)) => {
                        self.composer.crop_diseases(token, lang)
                    }
                    // A crop list without a crop mention cannot be built.
                    (TopicReply::CropDiseaseList, Fired::Plain) => self.default_text(lang),
                };
                (rule.topic, text)
            }
            None => (Topic::Default, self.default_text(lang)),
        };

        let template = if topic == Topic::Default {
            TemplateKind::DefaultResponse
        } else {
            TemplateKind::GenericTopicResponse
        };

        Resolution {
            text,
            intent: ChatIntent::General,
            template,
            topic: Some(topic),
            disease_id: None,
            matched_by: None,
            language: lang,
            suggestions: self.rules.suggestions.clone(),
        }
    }

    /// Text of the default topic rule.
    fn default_text(&self, lang: Language) -> String {
        self.rules
            .topic_rules
            .iter()
            .find_map(|r| match (&r.topic, &r.reply) {
                (Topic::Default, TopicReply::Fixed(text)) => Some(text.get(lang).to_string()),
                _ => None,
            })
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
    }
}

/// Used only when a custom rule table has no default topic.
const FALLBACK_REPLY: &str = "Je n'ai pas compris la question.";

fn phrase(text: &str, fold: bool) -> Phrase {
    words(&normalize_message(text, fold))
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn compile(trigger: &Trigger, fold: bool) -> Compiled {
    let phrases =
        |list: &Vec<String>| -> Vec<Phrase> { list.iter().map(|t| phrase(t, fold)).collect() };
    match trigger {
        Trigger::AnyOf(list) => Compiled::AnyOf(phrases(list)),
        Trigger::CropWith(list) => Compiled::CropWith(phrases(list)),
        Trigger::Always => Compiled::Always,
    }
}

fn alias_phrases(aliases: &[Alias], fold: bool) -> Vec<AliasPhrase> {
    aliases
        .iter()
        .map(|a| AliasPhrase {
            phrase: phrase(&a.text, fold),
            token: a.token.clone(),
        })
        .filter(|a| !a.phrase.is_empty())
        .collect()
}

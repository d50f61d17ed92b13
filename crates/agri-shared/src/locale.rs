//! Supported locales and localized text.
//!
//! French is the primary locale. Wolof and Pulaar are regional alternates;
//! any text missing in an alternate falls back to French.

use serde::{Deserialize, Serialize};

/// One of the three display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French (primary)
    #[default]
    Fr,
    /// Wolof
    Wo,
    /// Pulaar
    Pu,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Fr, Language::Wo, Language::Pu];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::Wo => "wo",
            Self::Pu => "pu",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fr => "Français",
            Self::Wo => "Wolof",
            Self::Pu => "Pulaar",
        }
    }

    /// Parse a language code or name. Returns None for anything unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fr" | "fra" | "french" | "francais" | "français" | "primary" => Some(Self::Fr),
            "wo" | "wol" | "wolof" | "alt1" => Some(Self::Wo),
            "pu" | "ff" | "ful" | "pulaar" | "alt2" => Some(Self::Pu),
            _ => None,
        }
    }

    /// Parse with fallback to the primary locale.
    pub fn parse_or_primary(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported language: {}", s))
    }
}

/// Text with a mandatory primary variant and optional alternates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub fr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pu: Option<String>,
}

impl LocalizedText {
    /// Primary-only text.
    pub fn new(fr: impl Into<String>) -> Self {
        Self {
            fr: fr.into(),
            wo: None,
            pu: None,
        }
    }

    /// Text in all three locales.
    pub fn tri(fr: impl Into<String>, wo: impl Into<String>, pu: impl Into<String>) -> Self {
        Self {
            fr: fr.into(),
            wo: Some(wo.into()),
            pu: Some(pu.into()),
        }
    }

    pub fn with_wo(mut self, wo: impl Into<String>) -> Self {
        self.wo = Some(wo.into());
        self
    }

    pub fn with_pu(mut self, pu: impl Into<String>) -> Self {
        self.pu = Some(pu.into());
        self
    }

    pub fn primary(&self) -> &str {
        &self.fr
    }

    /// Text for `lang`, falling back to the primary when the variant is
    /// absent or blank.
    pub fn get(&self, lang: Language) -> &str {
        let alt = match lang {
            Language::Fr => None,
            Language::Wo => self.wo.as_deref(),
            Language::Pu => self.pu.as_deref(),
        };
        match alt {
            Some(text) if !text.trim().is_empty() => text,
            _ => &self.fr,
        }
    }

    /// Every non-empty variant, primary first.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.fr.as_str())
            .chain(self.wo.as_deref())
            .chain(self.pu.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_names() {
        assert_eq!(Language::parse("fr"), Some(Language::Fr));
        assert_eq!(Language::parse("Wolof"), Some(Language::Wo));
        assert_eq!(Language::parse("alt2"), Some(Language::Pu));
        assert_eq!(Language::parse("en"), None);
        assert_eq!(Language::parse_or_primary("en"), Language::Fr);
    }

    #[test]
    fn test_fallback_to_primary() {
        let text = LocalizedText::new("Tomate").with_wo("Tomaat");
        assert_eq!(text.get(Language::Wo), "Tomaat");
        assert_eq!(text.get(Language::Pu), "Tomate");

        let blank = LocalizedText::new("Sain").with_pu("  ");
        assert_eq!(blank.get(Language::Pu), "Sain");
    }

    #[test]
    fn test_serde_lowercase_codes() {
        let json = serde_json::to_string(&Language::Pu).unwrap();
        assert_eq!(json, "\"pu\"");
        let lang: Language = serde_json::from_str("\"wo\"").unwrap();
        assert_eq!(lang, Language::Wo);
    }
}

//! Text normalization shared by the resolver, the reconciler and the catalog.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics: "brûlure précoce" -> "brulure precoce".
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize a free-text chat message: lower-case, typographic apostrophes
/// made plain, whitespace collapsed, optionally accent-folded.
pub fn normalize_message(text: &str, fold: bool) -> String {
    let lower = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    if fold {
        fold_accents(&collapsed)
    } else {
        collapsed
    }
}

/// Normalize a classifier label or catalog id for fuzzy comparison:
/// lower-case, `_` and `-` become spaces, runs of separators collapse.
pub fn normalize_label(text: &str) -> String {
    text.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split normalized text into words on anything that is not alphanumeric.
/// "d'arrosage" yields "d" and "arrosage".
pub fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when `phrase` occurs as a contiguous run of whole words in
/// `haystack`. An empty phrase never matches.
pub fn contains_phrase(haystack: &[&str], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(phrase.len())
        .any(|window| window.iter().zip(phrase).all(|(w, p)| *w == p.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("brûlure précoce"), "brulure precoce");
        assert_eq!(fold_accents("mosaïque"), "mosaique");
        assert_eq!(fold_accents("plain"), "plain");
    }

    #[test]
    fn test_normalize_message() {
        assert_eq!(
            normalize_message("  Symptômes   Brûlure\tPRÉCOCE ", true),
            "symptomes brulure precoce"
        );
        assert_eq!(normalize_message("Prévention", false), "prévention");
        assert_eq!(normalize_message("d\u{2019}arrosage", true), "d'arrosage");
        assert_eq!(normalize_message("", true), "");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Tomato_Late_blight"), "tomato late blight");
        assert_eq!(
            normalize_label("Pepper__bell___Bacterial_spot"),
            "pepper bell bacterial spot"
        );
        assert_eq!(normalize_label("  Two-spotted  "), "two spotted");
    }

    #[test]
    fn test_contains_phrase() {
        let msg = "prevention tache bacterienne poivron";
        let haystack = words(msg);
        let phrase = vec!["tache".to_string(), "bacterienne".to_string()];
        assert!(contains_phrase(&haystack, &phrase));

        let wrong_order = vec!["bacterienne".to_string(), "tache".to_string()];
        assert!(!contains_phrase(&haystack, &wrong_order));
        assert!(!contains_phrase(&haystack, &[]));
    }
}

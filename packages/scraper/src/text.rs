//! Text normalization utilities shared by extraction and beautification.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for loose matching: strip accents and lowercase.
///
/// # Examples
/// ```
/// use igedd_scraper::text::fold;
///
/// assert_eq!(fold("Cadrage Préalable"), "cadrage prealable");
/// ```
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Check whether `haystack` contains `needle`, ignoring case and accents.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

/// Replace typographic punctuation variants with their ASCII equivalents.
///
/// Fixes:
/// - Curly apostrophes (’ ‘) → `'`
/// - Non-breaking and narrow non-breaking spaces → regular space
pub fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' => '\'',
            '\u{a0}' | '\u{202f}' => ' ',
            other => other,
        })
        .collect()
}

/// Upper-case the first character and lower-case the rest.
///
/// # Examples
/// ```
/// use igedd_scraper::text::capitalize;
///
/// assert_eq!(capitalize("projet X"), "Projet x");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("Décisions prises"), "decisions prises");
        assert_eq!(fold("ÉVALUATION"), "evaluation");
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Cadrage préalable du projet", "cadrage prealable"));
        assert!(contains_folded("CADRAGE PREALABLE", "cadrage préalable"));
        assert!(!contains_folded("Avis délibéré", "cadrage"));
    }

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(
            normalize_punctuation("l\u{2019}autorité\u{a0}environnementale"),
            "l'autorité environnementale"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("élargissement de la RN 7"), "Élargissement de la rn 7");
        assert_eq!(capitalize("Projet X"), "Projet x");
    }
}

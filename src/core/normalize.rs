//! Matching-only canonical form of a text fragment.

/// Lowercases `text`, drops every character that is neither a word character
/// (alphanumeric or `_`) nor whitespace, and trims the ends.
///
/// Internal whitespace is kept as-is; nothing new is inserted, so
/// `"co-pay"` becomes `"copay"`.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    stripped.trim().to_string()
}

/// Number of whitespace-separated words in an already normalized string.
pub fn word_count(normalized: &str) -> usize {
    normalized.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize("  Coverage applies ONLY to hospitalization.  "),
            "coverage applies only to hospitalization"
        );
        assert_eq!(normalize("Pre-existing (PED) conditions;"), "preexisting ped conditions");
    }

    #[test]
    fn test_normalize_keeps_unicode_word_characters() {
        assert_eq!(normalize("Prämie: 1.000€"), "prämie 1000");
        assert_eq!(normalize("room_rent limit!"), "room_rent limit");
    }

    #[test]
    fn test_normalize_does_not_collapse_or_add_whitespace() {
        assert_eq!(normalize("a  -  b"), "a    b");
        assert_eq!(normalize("co-pay"), "copay");
    }

    #[test]
    fn test_normalize_empty_and_punctuation_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("...;:!?"), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("a    b"), 2);
        assert_eq!(word_count("coverage applies only to hospitalization"), 5);
    }
}

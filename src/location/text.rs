//! Text folding shared by the normalizer and the catalog.
//!
//! Both sides of a comparison go through [`fold`] exactly once, so matching
//! reduces to plain string equality or phrase search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, strip diacritics, collapse whitespace.
///
/// Letters that do not decompose under NFD (ø, ß, æ, ...) are mapped by hand.
pub fn fold(s: &str) -> String {
    let decomposed: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(decomposed.len());
    for c in decomposed.chars() {
        match c {
            'ø' => out.push('o'),
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ł' => out.push('l'),
            'đ' | 'ð' => out.push('d'),
            'þ' => out.push_str("th"),
            'ı' => out.push('i'),
            _ => out.push(c),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold a comma-separated string while keeping a single ", " between parts.
pub fn fold_list(s: &str) -> String {
    s.split(',')
        .map(fold)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether `needle` occurs in `haystack` on word boundaries.
///
/// Both arguments must already be folded. `"on"` does not match inside
/// `"duration"`, but `"north america"` matches inside
/// `"visible across north america."`.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Title-case each whitespace-separated word ("north america" -> "North America").
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold("Tromsø"), "tromso");
        assert_eq!(fold("São Paulo"), "sao paulo");
        assert_eq!(fold("Québec"), "quebec");
        assert_eq!(fold("Straße"), "strasse");
    }

    #[test]
    fn test_fold_whitespace() {
        assert_eq!(fold("  Multiple   Spaces  "), "multiple spaces");
        assert_eq!(fold("\tNew\nYork "), "new york");
    }

    #[test]
    fn test_fold_list() {
        assert_eq!(fold_list("Toronto ,ON,  Canada"), "toronto, on, canada");
        assert_eq!(fold_list("Austin,,TX"), "austin, tx");
    }

    #[test]
    fn test_contains_phrase_word_boundaries() {
        assert!(contains_phrase("visible across north america.", "north america"));
        assert!(contains_phrase("spain", "spain"));
        assert!(!contains_phrase("duration around 2m18s", "on"));
        assert!(!contains_phrase("new zealand", "new york"));
        assert!(contains_phrase("iceland, spain; portugal", "spain"));
    }

    #[test]
    fn test_contains_phrase_empty_needle() {
        assert!(!contains_phrase("anything", ""));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("north america"), "North America");
        assert_eq!(title_case("TOTAL"), "Total");
    }
}

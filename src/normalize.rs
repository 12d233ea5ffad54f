//! The one normalization used on both sides of every lookup.
//!
//! Reference names, song mentions and extractor dedup all go through
//! [`normalize_key`], so a key built from `name.basics.tsv` and a key built
//! from a song page can be compared with plain string equality.
//!
//! Policy:
//! - Unicode NFKD compatibility decomposition, then lower-case
//! - combining marks on Latin, Greek and Cyrillic letters are dropped
//!   (`Dilip Kumār` → `dilip kumar`); marks on other scripts are kept, since
//!   Indic vowel signs and viramas are part of the spelling
//! - quote characters are deleted (`Don't` → `dont`)
//! - any other non-alphanumeric character becomes a space
//! - whitespace runs collapse to one space, ends are trimmed

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const QUOTES: &[char] = &['\'', '"', '`', '´', '‘', '’', '‚', '“', '”', '„'];

/// Normalize a name or title into its lookup key.
///
/// ```
/// use giit_linker::normalize::normalize_key;
///
/// assert_eq!(normalize_key("  LATA   Mangeshkar "), "lata mangeshkar");
/// assert_eq!(normalize_key("Mughal-E-Azam"), "mughal e azam");
/// ```
pub fn normalize_key(raw: &str) -> String {
    // Lower-casing can produce decomposable chars, so decompose on both sides of it.
    let lowered: String = raw.nfkd().flat_map(char::to_lowercase).collect();

    let mut key = String::with_capacity(lowered.len());
    // Marks are kept only directly behind a kept letter whose script keeps them.
    let mut keep_marks = false;
    for c in lowered.nfkd() {
        if is_combining_mark(c) {
            if keep_marks {
                key.push(c);
            }
        } else if QUOTES.contains(&c) {
            keep_marks = false;
        } else if c.is_alphanumeric() {
            key.push(c);
            keep_marks = !is_accent_script(c);
        } else {
            key.push(' ');
            keep_marks = false;
        }
    }

    key.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Latin, Greek and Cyrillic blocks, where combining marks are accents.
fn is_accent_script(c: char) -> bool {
    matches!(
        c as u32,
        0x0000..=0x052F
            | 0x1C80..=0x1C8F
            | 0x1D00..=0x1FFF
            | 0x2C60..=0x2C7F
            | 0x2DE0..=0x2DFF
            | 0xA640..=0xA69F
            | 0xA720..=0xA7FF
            | 0xAB30..=0xAB6F
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let key = normalize_key("Lata Mangeshkar");
        assert_eq!(key, "lata mangeshkar");
        assert_eq!(normalize_key("lata   mangeshkar"), key);
        assert_eq!(normalize_key("LATA MANGESHKAR"), key);
        assert_eq!(normalize_key("\tLata\nMangeshkar  "), key);
    }

    #[test]
    fn test_diacritics_stripped() {
        assert_eq!(normalize_key("Dilip Kumār"), "dilip kumar");
        assert_eq!(normalize_key("Amélie"), "amelie");
    }

    #[test]
    fn test_quotes_deleted_other_punctuation_spaced() {
        assert_eq!(normalize_key("Don't"), normalize_key("Dont"));
        assert_eq!(normalize_key("Don’t"), "dont");
        assert_eq!(normalize_key("Kaho Naa... Pyaar Hai"), "kaho naa pyaar hai");
        assert_eq!(normalize_key("Hum Aapke Hain Koun..!"), "hum aapke hain koun");
    }

    #[test]
    fn test_compatibility_forms() {
        assert_eq!(normalize_key("Ｓｈｏｌａｙ"), "sholay");
    }

    #[test]
    fn test_digits_kept() {
        assert_eq!(normalize_key("1942: A Love Story"), "1942 a love story");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("  ... -- "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Lata Mangeshkar",
            "  Mughal-E-Azam ",
            "Kaho Naa... Pyaar Hai",
            "İstanbul",
            "ℌello Ｗorld",
            "Amélie Poulain's",
            "शोले",
            "",
        ];
        for s in samples {
            let once = normalize_key(s);
            assert_eq!(normalize_key(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_indic_vowel_signs_kept() {
        assert_ne!(normalize_key("कमल"), normalize_key("कोमल"));
        assert_eq!(normalize_key("कोमल"), "कोमल");
        assert_eq!(normalize_key(" प्रेम  पुजारी "), "प्रेम पुजारी");
    }

    #[test]
    fn test_greek_and_cyrillic_accents_stripped() {
        assert_eq!(normalize_key("Ёлка"), "елка");
        assert_eq!(normalize_key("Άλφα"), "αλφα");
    }

    #[test]
    fn test_marks_after_quotes_or_punctuation_dropped() {
        assert_eq!(normalize_key("क'\u{94B}"), "क");
        assert_eq!(normalize_key("x\u{964}\u{94B}y"), "x y");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in any::<String>()) {
            let once = normalize_key(&s);
            prop_assert_eq!(normalize_key(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_on_mixed_scripts(
            s in "[a-zA-Z\\x{915}-\\x{939}\\x{93C}\\x{93E}-\\x{94D}\\x{964}\\x{301}\\x{308}'. -]{0,24}"
        ) {
            let once = normalize_key(&s);
            prop_assert_eq!(normalize_key(&once), once);
        }

        #[test]
        fn normalize_ignores_ascii_case(s in "[a-zA-Z ]{0,30}") {
            prop_assert_eq!(normalize_key(&s.to_lowercase()), normalize_key(&s.to_uppercase()));
        }
    }
}

//! Locale-aware ordering of titles mixing Latin and Arabic script.
//!
//! Comparing UTF-8 bytes orders all uppercase Latin before lowercase,
//! places accented letters after `z`, and treats Arabic vowel marks as
//! significant. [`CollationKey`] instead compares in three levels:
//!
//! * primary: base letters only (canonical decomposition, combining marks,
//!   and the Arabic tatweel removed, case folded, Arabic letter variants
//!   folded), ordered by script group (separators, digits, Latin, Arabic,
//!   everything else) and then by code point within the group;
//! * secondary: the case-folded decomposed text, so accents and harakat
//!   break ties;
//! * tertiary: the original text.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const TATWEEL: char = '\u{0640}';

/// Sort key for a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationKey {
    primary: Vec<(u8, char)>,
    secondary: String,
    tertiary: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let secondary: String = text.nfd().flat_map(char::to_lowercase).collect();

        let primary = secondary
            .chars()
            .filter(|c| !is_combining_mark(*c) && *c != TATWEEL)
            .map(fold_arabic)
            .map(|c| (script_group(c), c))
            .collect();

        Self {
            primary,
            secondary,
            tertiary: text.to_string(),
        }
    }
}

impl Ord for CollationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .cmp(&other.primary)
            .then_with(|| self.secondary.cmp(&other.secondary))
            .then_with(|| self.tertiary.cmp(&other.tertiary))
    }
}

impl PartialOrd for CollationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn script_group(c: char) -> u8 {
    match c {
        c if c.is_whitespace() || c.is_ascii_punctuation() => 0,
        c if c.is_numeric() => 1,
        'a'..='z' | '\u{00C0}'..='\u{024F}' => 2,
        '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' => 3,
        _ => 4,
    }
}

/// Fold Arabic letter variants onto the letter they sort with.
fn fold_arabic(c: char) -> char {
    match c {
        // teh marbuta sorts with heh
        '\u{0629}' => '\u{0647}',
        // alef maksura sorts with yeh
        '\u{0649}' => '\u{064A}',
        // alef wasla
        '\u{0671}' => '\u{0627}',
        // Arabic-Indic digits sort with their ASCII values
        '\u{0660}'..='\u{0669}' => char::from_u32(c as u32 - 0x0660 + '0' as u32).unwrap_or(c),
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(a: &str, b: &str) -> Ordering {
        CollationKey::new(a).cmp(&CollationKey::new(b))
    }

    fn sorted(mut titles: Vec<&str>) -> Vec<&str> {
        titles.sort_by_cached_key(|title| CollationKey::new(title));
        titles
    }

    #[test]
    fn test_case_insensitive_latin() {
        assert_eq!(sorted(vec!["beta", "Alpha", "alpha", "Gamma"]), vec![
            "Alpha", "alpha", "beta", "Gamma"
        ]);
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        assert_eq!(sorted(vec!["zebra", "Émile", "eagle", "fox"]), vec![
            "eagle", "Émile", "fox", "zebra"
        ]);
    }

    #[test]
    fn test_latin_before_arabic() {
        assert_eq!(sorted(vec!["سياسة", "Politics", "اقتصاد", "1984"]), vec![
            "1984", "Politics", "اقتصاد", "سياسة"
        ]);
    }

    #[test]
    fn test_arabic_alphabetical_order() {
        // ba, ta, jeem, dal, seen, ain, meem, ya
        assert_eq!(sorted(vec!["يوم", "مدينة", "عالم", "سلام", "دولة", "جامعة", "تاريخ", "بحث"]), vec![
            "بحث", "تاريخ", "جامعة", "دولة", "سلام", "عالم", "مدينة", "يوم"
        ]);
    }

    #[test]
    fn test_hamza_and_harakat_ignored_at_primary_level() {
        // أحمد (alef with hamza) sorts with احمد, before بحث.
        assert_eq!(sorted(vec!["بحث", "أحمد", "احمد"]), vec!["احمد", "أحمد", "بحث"]);
        assert_eq!(compare("كِتَاب", "كتاب"), Ordering::Greater);
        assert_eq!(compare("كِتَاب", "كتب"), Ordering::Less);
    }

    #[test]
    fn test_tatweel_ignored() {
        let plain = CollationKey::new("سلام");
        let stretched = CollationKey::new("سـلام");
        assert_eq!(plain.primary, stretched.primary);
    }
}

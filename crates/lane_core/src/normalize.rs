//! City name canonicalization for self-exclusion, market anchor detection and dedup.
//!
//! `"St. Louis Market"`, `"Saint Louis"` and `"ST LOUIS"` all normalize to
//! `"saintlouis"`. Accents are folded through canonical decomposition and only ASCII
//! case folding is applied, so the result never depends on the process locale.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Trailing words dropped from market labels ("Chicago Mkt" -> "chicago").
const MARKET_SUFFIXES: &[&str] = &["market", "mkt"];

/// Abbreviation expansions applied per word after punctuation is removed.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("ft", "fort"),
    ("st", "saint"),
    ("ste", "sainte"),
    ("mt", "mount"),
];

/// Canonical comparison form of a city or market-area name.
///
/// Lowercases (ASCII), drops a trailing `market`/`mkt` word, expands `ft`/`st`/`mt`
/// abbreviations and removes every non-alphanumeric character.
///
/// Accented letters lose their marks first, so `"Cañon City"` and `"Canon City"`
/// share one form. Letters with no ASCII base (`ß`, `ø`) are removed like
/// punctuation.
pub fn normalize_city_name(name: &str) -> String {
    let lowered: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let mut words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    if words.len() > 1 {
        if let Some(last) = words.last() {
            if MARKET_SUFFIXES.contains(last) {
                words.pop();
            }
        }
    }

    words
        .into_iter()
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(short, _)| *short == word)
                .map_or(word, |(_, long)| *long)
        })
        .collect()
}

/// Canonical two-letter state/province code: trimmed, uppercased, alphanumeric only.
pub fn normalize_state(state: &str) -> String {
    state
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Identity key used for self-exclusion and the caller's used-city set.
pub fn city_key(name: &str, state: &str) -> String {
    format!("{}|{}", normalize_city_name(name), normalize_state(state))
}

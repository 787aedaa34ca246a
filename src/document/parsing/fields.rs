//! Field splitting
//!
//! One flushed question blob is peeled apart with an ordered marker grammar,
//! first match wins at every step: leading number, then the `Hint:` tail,
//! then the `Key:` tail, then lettered option markers. Option markers are
//! accepted left-to-right in alphabetical order only, so a marker-like
//! substring inside converted math (a stray `b)` before any `a)`) is inert.
//! A missing marker yields a `None` field, never an error; a question whose
//! number fails to parse still produces a record.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::config::ExtractConfig;

use super::super::models::QuestionRecord;

/// `N.` prefix capturing the question number
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.").expect("valid leading-number pattern"));

/// A question boundary appearing anywhere: digits, period, optional space,
/// uppercase letter
static NEXT_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s?[A-Z]").expect("valid next-question pattern"));

/// Candidate option marker: a lowercase letter directly before `)`
static OPTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])\)").expect("valid option-marker pattern"));

/// Split one accumulated question blob into its record fields.
pub(crate) fn split_fields(text: &str, config: &ExtractConfig) -> QuestionRecord {
    let text = text.trim();

    let (number, content) = match LEADING_NUMBER.captures(text) {
        Some(caps) => {
            let number = caps[1].parse::<u32>().ok();
            (number, text[caps[0].len()..].to_string())
        }
        // Degenerate path: no numbering, the whole blob is content.
        None => (None, text.to_string()),
    };

    let (main, hint) = match content.split_once(&config.hint_marker) {
        Some((main, raw_hint)) => (main.to_string(), Some(truncate_hint(raw_hint))),
        None => (content, None),
    };

    let (option_text, key) = match main.split_once(&config.key_marker) {
        Some((left, raw_key)) => (left.to_string(), Some(raw_key.trim().to_string())),
        None => (main, None),
    };

    let (stem, options) = split_options(&option_text, config);

    QuestionRecord {
        number,
        stem,
        options,
        key,
        hint,
        images: Vec::new(),
    }
}

/// A hint ends where the next question begins. Malformed documents run
/// question texts together; without this cut a hint would swallow the
/// following question.
fn truncate_hint(raw: &str) -> String {
    match NEXT_QUESTION.find(raw) {
        Some(m) => raw[..m.start()].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Leading question number of a blob, if its start matches the numbering
/// pattern.
pub(crate) fn leading_number(text: &str) -> Option<u32> {
    LEADING_NUMBER
        .captures(text.trim_start())
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// Parse the option-bearing text: everything before the first accepted
/// marker is the stem, each marker owns the text up to the next one.
fn split_options(text: &str, config: &ExtractConfig) -> (String, BTreeMap<char, String>) {
    let mut expected = config.option_letters.chars();
    let mut next_letter = expected.next();

    // Accepted markers as (letter, match start, match end).
    let mut markers: Vec<(char, usize, usize)> = Vec::new();
    for m in OPTION_MARKER.find_iter(text) {
        let letter = text[m.start()..].chars().next().unwrap_or_default();
        if Some(letter) != next_letter || !config.is_option_letter(letter) {
            continue;
        }
        // The letter must start a token: "extra)" is a word, not a marker.
        let boundary_ok = text[..m.start()]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        if !boundary_ok {
            continue;
        }
        markers.push((letter, m.start(), m.end()));
        next_letter = expected.next();
    }

    let Some(&(_, first_start, _)) = markers.first() else {
        return (text.trim().to_string(), BTreeMap::new());
    };

    let stem = text[..first_start].trim().to_string();
    let mut options = BTreeMap::new();
    for (i, &(letter, _, value_start)) in markers.iter().enumerate() {
        let value_end = markers
            .get(i + 1)
            .map(|&(_, next_start, _)| next_start)
            .unwrap_or(text.len());
        options.insert(letter, text[value_start..value_end].trim().to_string());
    }

    (stem, options)
}

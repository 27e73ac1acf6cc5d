//! Per-record consistency rules.
//!
//! Every field has runs of newlines collapsed to a single space. Title-like
//! fields get word-level capitalization protection and page ranges are
//! rewritten to use a single en-dash.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{FieldValue, Record, Word};

/// Fields whose uppercase words are protected from re-casing.
pub const PROTECTED_FIELDS: &[&str] = &["title", "booktitle"];

static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("valid regex"));
static PAGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[-–]+\s*").expect("valid regex"));

/// Replaces each run of newlines with a single space.
pub fn collapse_newlines(text: &str) -> String {
    NEWLINES.replace_all(text, " ").into_owned()
}

/// Splits `text` on spaces and protects every word containing an uppercase letter.
///
/// Braces already present in the text are discarded first, so a value that
/// was protected before is protected the same way again. `$…$` math is kept
/// whole, braces and spaces included, and escaped braces are left alone.
pub fn protect_words(text: &str) -> Vec<Word> {
    split_words(text)
        .into_iter()
        .map(|token| {
            if token.chars().any(char::is_uppercase) {
                Word::Protected(token)
            } else {
                Word::Plain(token)
            }
        })
        .collect()
}

fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_math = false;
    let mut escaped = false;

    for c in text.chars() {
        match c {
            '$' if !escaped => {
                in_math = !in_math;
                word.push(c);
            }
            '{' | '}' if !escaped && !in_math => {}
            ' ' if !in_math => words.push(std::mem::take(&mut word)),
            _ => word.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    words.push(word);
    words
}

/// Normalizes a page range: "12-34", "12 - 34" and "12–34" all become "12–34".
pub fn normalize_pages(text: &str) -> String {
    PAGE_SEPARATOR.replace_all(text, "-").replace('-', "–")
}

/// Applies every field rule to one record in place.
pub fn normalize_record(record: &mut Record) {
    for (name, value) in record.fields.iter_mut() {
        let text = collapse_newlines(&value.plain_text());

        *value = if PROTECTED_FIELDS.contains(&name.as_str()) {
            FieldValue::Words(protect_words(&text))
        } else if name == "pages" {
            FieldValue::Plain(normalize_pages(&text))
        } else {
            FieldValue::Plain(text)
        };
    }
}

/// Drops comment records and normalizes the rest, preserving order.
pub fn normalize_all(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let normalized: Vec<Record> = records
        .into_iter()
        .filter(|r| !r.is_comment())
        .map(|mut r| {
            normalize_record(&mut r);
            r
        })
        .collect();

    if normalized.len() != before {
        tracing::debug!(dropped = before - normalized.len(), "dropped comment records");
    }
    normalized
}

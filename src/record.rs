//! Bibliographic records and their field values.
//!
//! A [`Record`] is one BibTeX entry: a type tag, a citation key and a map of
//! named fields. Field values keep capitalization protection as data instead
//! of embedding `{...}` markers in the text, so every output target decides
//! for itself how (and whether) to show it.

use std::collections::BTreeMap;

/// Entry type of records that carry no citable content.
pub const COMMENT_TYPE: &str = "comment";

/// One word of a title-like field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    /// A word a downstream formatter may re-case freely.
    Plain(String),
    /// A word whose casing must survive any downstream formatter.
    Protected(String),
}

impl Word {
    /// The bare text of the word.
    pub fn text(&self) -> &str {
        match self {
            Word::Plain(s) | Word::Protected(s) => s,
        }
    }

    /// Returns true if the word is wrapped in protection.
    pub fn is_protected(&self) -> bool {
        matches!(self, Word::Protected(_))
    }
}

/// The value of a single record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// An ordinary string.
    Plain(String),
    /// A space-separated sequence of words, some of them protected.
    Words(Vec<Word>),
}

impl FieldValue {
    /// Text without any protection markers (tabular and hypertext output).
    pub fn plain_text(&self) -> String {
        match self {
            FieldValue::Plain(s) => s.clone(),
            FieldValue::Words(words) => words
                .iter()
                .map(Word::text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Text with protected words wrapped in braces (BibTeX output).
    pub fn bibtex_text(&self) -> String {
        match self {
            FieldValue::Plain(s) => s.clone(),
            FieldValue::Words(words) => words
                .iter()
                .map(|w| match w {
                    Word::Plain(s) => s.clone(),
                    Word::Protected(s) => format!("{{{}}}", s),
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Plain(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Plain(s)
    }
}

/// A single bibliographic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Citation key; also the file stem of the record's auxiliary files.
    pub id: String,
    /// Lowercase entry type (e.g. "article", "inproceedings").
    pub entry_type: String,
    /// Fields by lowercase name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a record without fields.
    pub fn new(id: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            entry_type: entry_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter, handy for constructing records in code.
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets (or replaces) a field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Returns the raw value of a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the plain text of a field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(FieldValue::plain_text)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn is_comment(&self) -> bool {
        self.entry_type == COMMENT_TYPE
    }
}

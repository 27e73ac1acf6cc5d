//! BibTeX loading and writing.
//!
//! Parsing is delegated to the `biblatex` crate; this module turns its
//! entries into [`Record`]s, applies the explicit [`LoadOptions`] and writes
//! records back out in BibTeX syntax.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use biblatex::{Bibliography, Chunk, ChunksRef};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::Record;

/// Fields biblatex reads with escapes turned off.
const VERBATIM_FIELDS: &[&str] = &[
    "doi", "eprint", "file", "pdf", "uri", "url", "urlraw", "verba", "verbb", "verbc",
];

/// Errors that can occur when loading records.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("invalid BibTeX: {0}")]
    Parse(String),

    #[error("expected {expected} record(s), one per input file, but found {found}")]
    CountMismatch { expected: usize, found: usize },
}

/// Entry types defined by classic BibTeX.
const STANDARD_TYPES: &[&str] = &[
    "article",
    "book",
    "booklet",
    "conference",
    "inbook",
    "incollection",
    "inproceedings",
    "manual",
    "mastersthesis",
    "misc",
    "phdthesis",
    "proceedings",
    "techreport",
    "unpublished",
];

/// Field-name aliases folded together when homogenising.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("authors", "author"),
    ("editors", "editor"),
    ("keyword", "keywords"),
    ("link", "url"),
    ("subjects", "subject"),
];

/// Parser configuration, passed explicitly to the load step.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Lowercase field names and fold common aliases (`authors` → `author`, ...).
    pub homogenise_fields: bool,
    /// Drop records whose type is not a classic BibTeX type.
    pub ignore_nonstandard_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            homogenise_fields: true,
            ignore_nonstandard_types: false,
        }
    }
}

/// Loads records from a set of BibTeX files, each holding one citable record.
///
/// Paths are read in sorted order and parsed as one bibliography. The number
/// of non-comment records must equal the number of files.
///
/// # Errors
///
/// Returns an error if a file cannot be read or decoded, if the combined
/// text is not valid BibTeX, or if the record count does not match.
pub fn load_records(paths: &[PathBuf], options: &LoadOptions) -> Result<Vec<Record>, LoadError> {
    let mut paths = paths.to_vec();
    paths.sort();

    let mut source = String::new();
    for path in &paths {
        source.push_str(&read_bib_file(path)?);
        source.push('\n');
    }

    let records = parse_records(&source, options)?;

    let found = records.iter().filter(|r| !r.is_comment()).count();
    if found != paths.len() {
        return Err(LoadError::CountMismatch {
            expected: paths.len(),
            found,
        });
    }

    info!(files = paths.len(), records = found, "loaded bibliography");
    Ok(records)
}

fn read_bib_file(path: &Path) -> Result<String, LoadError> {
    debug!(path = %path.display(), "reading");
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::InvalidData {
            LoadError::Encoding {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Parses BibTeX source text into records, in source order.
pub fn parse_records(source: &str, options: &LoadOptions) -> Result<Vec<Record>, LoadError> {
    let bibliography = Bibliography::parse(source).map_err(|e| LoadError::Parse(e.to_string()))?;

    let mut records = Vec::new();
    for entry in bibliography.iter() {
        let entry_type = entry.entry_type.to_string().to_lowercase();

        if options.ignore_nonstandard_types && !STANDARD_TYPES.contains(&entry_type.as_str()) {
            warn!(id = %entry.key, entry_type = %entry_type, "skipping non-standard entry type");
            continue;
        }

        let mut record = Record::new(entry.key.clone(), entry_type);
        for (name, chunks) in &entry.fields {
            let text = tex_text(chunks, VERBATIM_FIELDS.contains(&name.to_lowercase().as_str()));

            let name = if options.homogenise_fields {
                homogenise_field_name(name)
            } else {
                name.clone()
            };
            record.set(&name, text);
        }
        records.push(record);
    }

    Ok(records)
}

/// Serializes parsed chunks back into TeX source.
///
/// Special characters are escaped again, brace groups keep their braces and
/// math keeps its `$` delimiters with the content untouched.
fn tex_text(chunks: ChunksRef<'_>, verbatim_field: bool) -> String {
    let mut out = String::new();
    for chunk in chunks {
        match &chunk.v {
            Chunk::Normal(_) => out.push_str(&chunk.v.to_biblatex_string(verbatim_field)),
            Chunk::Verbatim(_) => {
                out.push('{');
                out.push_str(&chunk.v.to_biblatex_string(true));
                out.push('}');
            }
            Chunk::Math(math) => {
                out.push('$');
                out.push_str(math);
                out.push('$');
            }
        }
    }
    out
}

fn homogenise_field_name(name: &str) -> String {
    let lower = name.to_lowercase();
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

/// Serializes one record in BibTeX syntax.
///
/// Fields are written in name order, one per line; protected words are
/// wrapped in braces.
pub fn write_entry(record: &Record) -> String {
    let mut out = format!("@{}{{{}", record.entry_type, record.id);
    for (name, value) in &record.fields {
        out.push_str(",\n ");
        out.push_str(name);
        out.push_str(" = {");
        out.push_str(&value.bibtex_text());
        out.push('}');
    }
    out.push_str("\n}\n");
    out
}

/// Serializes a sequence of records, separated by blank lines.
pub fn write_entries<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    records
        .into_iter()
        .map(write_entry)
        .map(|e| e + "\n")
        .collect()
}

//! HTML citation rendering.
//!
//! Each supported entry type maps to one [`Style`]. A rendered citation is
//! the styled reference followed by a bracketed list of links: the record's
//! BibTeX file, its URL, and any auxiliary PDFs found next to it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::Record;

/// Errors that can occur while rendering a citation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("record '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("record '{id}' has unsupported entry type '{entry_type}'")]
    UnsupportedType { id: String, entry_type: String },
}

/// Synthesized field name reported when a book has neither author nor editor.
pub const AUTHOR_OR_EDITOR: &str = "author-or-editor";

/// Citation style of an entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Article,
    /// Shared by `@book` and `@proceedings`.
    Book,
    InProceedings,
    InCollection,
    Misc,
}

impl Style {
    pub fn for_entry_type(entry_type: &str) -> Option<Style> {
        match entry_type {
            "article" => Some(Style::Article),
            "book" | "proceedings" => Some(Style::Book),
            "inproceedings" => Some(Style::InProceedings),
            "incollection" => Some(Style::InCollection),
            "misc" => Some(Style::Misc),
            _ => None,
        }
    }
}

/// An auxiliary file that may accompany a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Abstract,
    Pdf,
    Slides,
    Poster,
}

impl AssetKind {
    /// All kinds, in link order.
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Abstract,
        AssetKind::Pdf,
        AssetKind::Slides,
        AssetKind::Poster,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Abstract => "abstract",
            AssetKind::Pdf => "pdf",
            AssetKind::Slides => "slides",
            AssetKind::Poster => "poster",
        }
    }

    /// File name of this asset for the given record id.
    pub fn file_name(self, id: &str) -> String {
        match self {
            AssetKind::Pdf => format!("{}.pdf", id),
            kind => format!("{}_{}.pdf", id, kind.label()),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory searched for auxiliary PDFs.
    pub pdf_dir: PathBuf,
    /// Directory the per-record `.bib` links point into.
    pub bib_link_dir: String,
    /// Author names to underline, matched exactly.
    pub special_authors: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            pdf_dir: PathBuf::from("pdf"),
            bib_link_dir: "bib".to_string(),
            special_authors: vec!["Heinrich, Philipp".to_string(), "Heinrich, P.".to_string()],
        }
    }
}

/// Formats a BibTeX name list for display.
///
/// Names joined by " and " are joined by "; " instead, and any name that
/// exactly matches one of `special` is underlined.
pub fn format_authors(names: &str, special: &[String]) -> String {
    names
        .split(" and ")
        .map(|name| {
            if special.iter().any(|s| s == name) {
                format!("<u>{}</u>", name)
            } else {
                name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Finds the auxiliary files present for a record, in link order.
///
/// The filesystem is checked on every call.
pub fn find_assets(pdf_dir: &Path, id: &str) -> Vec<(AssetKind, PathBuf)> {
    AssetKind::ALL
        .into_iter()
        .map(|kind| (kind, pdf_dir.join(kind.file_name(id))))
        .filter(|(_, path)| path.is_file())
        .collect()
}

/// Replaces the TeX escapes that survive into the HTML.
pub fn unescape(html: &str) -> String {
    html.replace("``", "&ldquo;")
        .replace("''", "&rdquo;")
        .replace("\\_", "_")
        .replace("\\&", "&")
}

fn require(record: &Record, field: &'static str) -> Result<String, RenderError> {
    record.text(field).ok_or_else(|| RenderError::MissingField {
        id: record.id.clone(),
        field,
    })
}

/// Renders one record as an HTML citation with its link list.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedType`] for entry types without a style
/// and [`RenderError::MissingField`] for the first absent required field.
pub fn render_citation(record: &Record, options: &RenderOptions) -> Result<String, RenderError> {
    let style =
        Style::for_entry_type(&record.entry_type).ok_or_else(|| RenderError::UnsupportedType {
            id: record.id.clone(),
            entry_type: record.entry_type.clone(),
        })?;

    let body = match style {
        Style::Article => render_article(record, options)?,
        Style::Book => render_book(record, options)?,
        Style::InProceedings => render_inproceedings(record, options)?,
        Style::InCollection => render_incollection(record, options)?,
        Style::Misc => render_misc(record, options)?,
    };

    // Brace protection never reaches the HTML.
    let mut out: String = body.chars().filter(|c| *c != '{' && *c != '}').collect();
    out.push_str(" [");
    out.push_str(&links(record, options).join(", "));
    out.push(']');

    Ok(unescape(&out))
}

fn links(record: &Record, options: &RenderOptions) -> Vec<String> {
    let mut links = vec![format!(
        r#"<a href="{}/{}.bib">bib</a>"#,
        options.bib_link_dir, record.id
    )];

    if let Some(url) = record.text("url") {
        links.push(format!(r#"<a href="{}">web</a>"#, url));
    }

    let assets = find_assets(&options.pdf_dir, &record.id);
    tracing::debug!(id = %record.id, assets = assets.len(), "checked auxiliary files");
    for (kind, path) in assets {
        links.push(format!(
            r#"<a href="{}">{}</a>"#,
            path.display(),
            kind.label()
        ));
    }

    links
}

/// `Author (Year). <b>Title</b>. <i>Journal</i> <b>Volume</b>(Number): Pages.`
fn render_article(record: &Record, options: &RenderOptions) -> Result<String, RenderError> {
    let author = require(record, "author")?;
    let title = require(record, "title")?;
    let journal = require(record, "journal")?;
    let year = require(record, "year")?;
    let volume = require(record, "volume")?;
    let pages = require(record, "pages")?;

    let mut volume_number = format!("<b>{}</b>", volume);
    if let Some(number) = record.text("number") {
        volume_number.push_str(&format!("({})", number));
    }

    Ok([
        format_authors(&author, &options.special_authors),
        format!("({}).", year),
        format!("<b>{}</b>.", title),
        format!("<i>{}</i>", journal),
        format!("{}:", volume_number),
        format!("{}.", pages),
    ]
    .join(" "))
}

/// `Author/Editor (Year). <b>Title</b>. Address: Publisher.`
fn render_book(record: &Record, options: &RenderOptions) -> Result<String, RenderError> {
    let names = record
        .text("author")
        .or_else(|| record.text("editor"))
        .ok_or_else(|| RenderError::MissingField {
            id: record.id.clone(),
            field: AUTHOR_OR_EDITOR,
        })?;
    let title = require(record, "title")?;
    let year = require(record, "year")?;
    let address = require(record, "address")?;
    let publisher = require(record, "publisher")?;

    Ok([
        format_authors(&names, &options.special_authors),
        format!("({}).", year),
        format!("<b>{}</b>.", title),
        format!("{}:", address),
        format!("{}.", publisher),
    ]
    .join(" "))
}

/// `Author (Year). <b>Title</b>. In <i>Booktitle</i>, pages Pages, Address.`
fn render_inproceedings(record: &Record, options: &RenderOptions) -> Result<String, RenderError> {
    let author = require(record, "author")?;
    let title = require(record, "title")?;
    let booktitle = require(record, "booktitle")?;
    let pages = require(record, "pages")?;
    let address = require(record, "address")?;
    let year = require(record, "year")?;

    Ok([
        format_authors(&author, &options.special_authors),
        format!("({}).", year),
        format!("<b>{}</b>.", title),
        format!("In <i>{}</i>,", booktitle),
        format!("pages {},", pages),
        format!("{}.", address),
    ]
    .join(" "))
}

/// `Author (Year). <b>Title</b>. In <i>Booktitle</i>, edited by Editor, pages Pages, Address: Publisher.`
fn render_incollection(record: &Record, options: &RenderOptions) -> Result<String, RenderError> {
    let author = require(record, "author")?;
    let title = require(record, "title")?;
    let booktitle = require(record, "booktitle")?;
    let editor = require(record, "editor")?;
    let pages = require(record, "pages")?;
    let address = require(record, "address")?;
    let publisher = require(record, "publisher")?;
    let year = require(record, "year")?;

    Ok([
        format_authors(&author, &options.special_authors),
        format!("({}).", year),
        format!("<b>{}</b>.", title),
        format!("In <i>{}</i>,", booktitle),
        format!("edited by {},", format_authors(&editor, &options.special_authors)),
        format!("pages {},", pages),
        format!("{}:", address),
        format!("{}.", publisher),
    ]
    .join(" "))
}

/// `Author (Year). <b>Title</b>. <i>Howpublished</i>.`
fn render_misc(record: &Record, options: &RenderOptions) -> Result<String, RenderError> {
    let author = require(record, "author")?;
    let title = require(record, "title")?;
    let howpublished = require(record, "howpublished")?;
    let year = require(record, "year")?;

    Ok([
        format_authors(&author, &options.special_authors),
        format!("({}).", year),
        format!("<b>{}</b>.", title),
        format!("<i>{}</i>.", howpublished),
    ]
    .join(" "))
}

//! publist: turn a folder of hand-maintained BibTeX records into a publication list.
//!
//! This library provides functionality to:
//! - Load BibTeX records (one per file) with explicit parser options
//! - Normalize field values (whitespace, capitalization protection, page ranges)
//! - Group records by category and order them by date
//! - Render records as HTML citations with links to auxiliary files
//! - Write a TSV export, a re-serialized BibTeX file and an HTML listing

pub mod bibtex;
pub mod classify;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod render;

pub use bibtex::{load_records, parse_records, write_entry, LoadError, LoadOptions};
pub use classify::{
    category_key, date_key, group_by_category, group_by_date, group_records, sorted_by_date_desc,
    Category, ClassifyError, Ordering,
};
pub use normalize::{normalize_all, normalize_record};
pub use output::{bib_document, html_document, tsv_document};
pub use pipeline::{
    build_artifacts, discover_inputs, run, OutputPaths, PipelineConfig, PipelineError, Summary,
};
pub use record::{FieldValue, Record, Word};
pub use render::{find_assets, format_authors, render_citation, AssetKind, RenderError, RenderOptions};

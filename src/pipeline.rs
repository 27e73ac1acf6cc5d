//! End-to-end driver: load, normalize, classify, render, write.
//!
//! All three artifacts are built in memory first. Files are only touched once
//! every record has been validated and rendered, and each file is written to
//! a temporary sibling before being renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bibtex::{load_records, LoadError, LoadOptions};
use crate::classify::{group_by_category, Category, ClassifyError};
use crate::normalize::normalize_all;
use crate::output::{bib_document, html_document, tsv_document, HtmlError};
use crate::record::Record;
use crate::render::{RenderError, RenderOptions};

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("unknown category '{key}'")]
    CategoryMismatch { key: String },

    #[error("failed to build the tabular export: {0}")]
    Tabular(#[from] csv::Error),

    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<HtmlError> for PipelineError {
    fn from(e: HtmlError) -> Self {
        match e {
            HtmlError::Classify(e) => PipelineError::Classify(e),
            HtmlError::Render(e) => PipelineError::Render(e),
        }
    }
}

/// Destinations of the three artifacts.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub tsv: PathBuf,
    pub bib: PathBuf,
    pub html: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        OutputPaths {
            tsv: PathBuf::from("publications.tsv"),
            bib: PathBuf::from("publications.bib"),
            html: PathBuf::from("publications.html"),
        }
    }
}

impl OutputPaths {
    /// The default file names, placed under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = OutputPaths::default();
        OutputPaths {
            tsv: dir.join(defaults.tsv),
            bib: dir.join(defaults.bib),
            html: dir.join(defaults.html),
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Input BibTeX files, one citable record each.
    pub inputs: Vec<PathBuf>,
    pub load: LoadOptions,
    pub render: RenderOptions,
    pub outputs: OutputPaths,
    /// Date stamped into the HTML footer.
    pub today: NaiveDate,
}

/// The rendered artifacts, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub tsv: String,
    pub bib: String,
    pub html: String,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    /// Record count per category, in presentation order (empty categories omitted).
    pub categories: Vec<(Category, usize)>,
}

/// Expands a glob pattern into the matching files, sorted.
pub fn discover_inputs(pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = glob::glob(pattern).map_err(|e| PipelineError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(PipelineError::Io {
                    path,
                    source: io::Error::from(e),
                });
            }
        }
    }
    paths.sort();

    if paths.is_empty() {
        warn!(pattern, "no input files matched");
    }
    debug!(pattern, files = paths.len(), "discovered inputs");
    Ok(paths)
}

/// Maps category keys onto the fixed presentation table.
///
/// # Errors
///
/// Returns [`PipelineError::CategoryMismatch`] for the first key that has no
/// presentation category.
pub fn presentation_sections<'a>(
    by_category: &BTreeMap<String, Vec<&'a Record>>,
) -> Result<BTreeMap<Category, Vec<&'a Record>>, PipelineError> {
    let mut sections = BTreeMap::new();
    for (key, records) in by_category {
        let category = Category::from_key(key)
            .ok_or_else(|| PipelineError::CategoryMismatch { key: key.clone() })?;
        sections.insert(category, records.clone());
    }
    Ok(sections)
}

/// Builds all three artifacts from normalized records.
pub fn build_artifacts(
    records: &[Record],
    render: &RenderOptions,
    today: NaiveDate,
) -> Result<(Artifacts, Summary), PipelineError> {
    let by_category = group_by_category(records);
    let sections = presentation_sections(&by_category)?;

    let artifacts = Artifacts {
        tsv: tsv_document(records)?,
        bib: bib_document(&by_category)?,
        html: html_document(&sections, render, today)?,
    };

    let summary = Summary {
        records: records.len(),
        categories: sections.iter().map(|(c, rs)| (*c, rs.len())).collect(),
    };

    Ok((artifacts, summary))
}

/// Writes the artifacts, each via a temporary file renamed into place.
///
/// Every file is staged before the first rename. If a staging write fails,
/// all staged files are removed and no target is touched. If a rename fails,
/// targets renamed before it keep their new content and the remaining staged
/// files are removed.
pub fn write_artifacts(artifacts: &Artifacts, paths: &OutputPaths) -> Result<(), PipelineError> {
    let targets = [
        (&paths.tsv, &artifacts.tsv),
        (&paths.bib, &artifacts.bib),
        (&paths.html, &artifacts.html),
    ];

    let mut staged = Vec::with_capacity(targets.len());
    for (path, content) in targets {
        let tmp = staging_path(path);
        if let Err(source) = fs::write(&tmp, content) {
            discard_staged(&staged);
            return Err(PipelineError::Io { path: tmp, source });
        }
        staged.push((tmp, path));
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(tmp, path) {
            discard_staged(&staged[i..]);
            return Err(PipelineError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        info!(path = %path.display(), "wrote");
    }

    Ok(())
}

fn discard_staged(staged: &[(PathBuf, &PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = fs::remove_file(tmp) {
            warn!(path = %tmp.display(), error = %e, "could not remove staged file");
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Runs the whole pipeline.
pub fn run(config: &PipelineConfig) -> Result<Summary, PipelineError> {
    let records = normalize_all(load_records(&config.inputs, &config.load)?);
    info!(records = records.len(), "normalized records");

    let (artifacts, summary) = build_artifacts(&records, &config.render, config.today)?;
    write_artifacts(&artifacts, &config.outputs)?;

    Ok(summary)
}

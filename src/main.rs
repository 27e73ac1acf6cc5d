//! CLI for publist - Build a publication list from a folder of BibTeX records.

use std::fmt;
use std::path::PathBuf;
use std::process;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use publist::{
    discover_inputs, run, LoadError, LoadOptions, OutputPaths, PipelineConfig, PipelineError,
    RenderOptions,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Build a publication list (TSV, BibTeX and HTML) from BibTeX records
#[derive(Parser)]
#[command(name = "publist")]
#[command(version)]
#[command(after_help = "\
Writes publications.tsv, publications.bib and publications.html to the
current directory.

Examples:
  publist
  publist --glob-bib 'papers/**/*.bib' --pdf-dir static/pdf/")]
struct Cli {
    /// Glob pattern matching the input .bib files (one record per file)
    #[arg(long, alias = "glob_bib", default_value = "bib/*.bib")]
    glob_bib: String,

    /// Directory holding auxiliary PDFs ({id}.pdf, {id}_slides.pdf, ...)
    #[arg(long, alias = "pdf_dir", default_value = "pdf/")]
    pdf_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — input pattern invalid / input file unreadable
    Input(String),
    /// Exit 11 — BibTeX could not be parsed or record count is off
    Parse(String),
    /// Exit 12 — a record cannot be classified or rendered
    Record(String),
    /// Exit 13 — a record falls outside the known categories
    Category(String),
    /// Exit 15 — cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) => 10,
            AppError::Parse(_) => 11,
            AppError::Record(_) => 12,
            AppError::Category(_) => 13,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(msg) => {
                write!(f, "{}\n  hint: check the --glob-bib pattern and file permissions", msg)
            }
            AppError::Parse(msg) => {
                write!(
                    f,
                    "{}\n  hint: every input file must hold exactly one BibTeX record",
                    msg
                )
            }
            AppError::Record(msg) => write!(f, "{}", msg),
            AppError::Category(msg) => {
                write!(
                    f,
                    "{}\n  hint: supported types are article, book, proceedings, inproceedings, incollection and misc",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the current directory is writable",
                    msg
                )
            }
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Pattern { .. } => AppError::Input(e.to_string()),
            PipelineError::Load(LoadError::Io { .. } | LoadError::Encoding { .. }) => {
                AppError::Input(e.to_string())
            }
            PipelineError::Load(_) => AppError::Parse(e.to_string()),
            PipelineError::Classify(_) | PipelineError::Render(_) => {
                AppError::Record(e.to_string())
            }
            PipelineError::CategoryMismatch { .. } => AppError::Category(e.to_string()),
            PipelineError::Tabular(_) | PipelineError::Io { .. } => {
                AppError::OutputFile(e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "publist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run_cli() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = PipelineConfig {
        inputs: discover_inputs(&cli.glob_bib)?,
        load: LoadOptions::default(),
        render: RenderOptions {
            pdf_dir: cli.pdf_dir,
            ..RenderOptions::default()
        },
        outputs: OutputPaths::default(),
        today: Local::now().date_naive(),
    };

    if !config.render.pdf_dir.is_dir() {
        tracing::warn!(
            pdf_dir = %config.render.pdf_dir.display(),
            "PDF directory not found, no auxiliary links will be added"
        );
    }

    let summary = run(&config)?;

    let categories = summary
        .categories
        .iter()
        .map(|(c, n)| format!("{} {}", n, c.key()))
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!(
        records = summary.records,
        "processed {} record(s) ({})",
        summary.records,
        categories
    );

    Ok(())
}

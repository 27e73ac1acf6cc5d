//! Shared test fixtures and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A journal article dated more precisely than its year.
pub const ARTICLE_2021: &str = r#"@article{doe2021,
  author = {Doe, Jane and Heinrich, Philipp},
  title = {Parsing German Tweets},
  journal = {Journal of Tests},
  volume = {7},
  pages = {1 - 20},
  year = {2020},
  date = {2021-03}
}
"#;

/// A journal article with only a year.
pub const ARTICLE_2020: &str = r#"@article{roe2020,
  author = {Roe, Richard},
  title = {An Older Study},
  journal = {Journal of Tests},
  volume = {6},
  pages = {5-9},
  year = {2020}
}
"#;

/// A conference paper filed as a shared task by its note.
pub const SHARED_TASK: &str = r#"@inproceedings{team2019,
  author = {Heinrich, P. and Roe, Richard},
  title = {Our System for the Tagging Challenge},
  booktitle = {Proceedings of the Workshop},
  pages = {30--35},
  address = {Florence},
  year = {2019},
  note = {SharedTask results}
}
"#;

/// A talk.
pub const TALK: &str = r#"@misc{talk2022,
  author = {Heinrich, Philipp},
  title = {Keywords in Context},
  howpublished = {Invited talk, Example University},
  year = {2022}
}
"#;

/// A talk whose fields carry math and escaped special characters.
pub const TEX_TALK: &str = r#"@misc{tex2023,
  author = {Doe, Jane},
  title = {The $\alpha$ Model},
  howpublished = {Tom \& Jerry\_Show},
  year = {2023}
}
"#;

/// A journal article that cannot be rendered.
pub const ARTICLE_WITHOUT_PAGES: &str = r#"@article{nopages2020,
  author = {Doe, Jane},
  title = {No Pages},
  journal = {Journal of Tests},
  volume = {1},
  year = {2020}
}
"#;

/// A record whose type has no presentation category.
pub const THESIS: &str = r#"@phdthesis{thesis2018,
  author = {Doe, Jane},
  title = {A Thesis},
  school = {Example University},
  year = {2018}
}
"#;

/// Writes `files` as `{dir}/bib/{name}.bib` and returns their paths.
pub fn write_bib_dir(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    let bib_dir = dir.join("bib");
    fs::create_dir_all(&bib_dir).unwrap();
    files
        .iter()
        .map(|(name, content)| {
            let path = bib_dir.join(format!("{}.bib", name));
            fs::write(&path, content).unwrap();
            path
        })
        .collect()
}

/// Creates empty auxiliary PDFs under `{dir}/pdf/`.
pub fn write_pdfs(dir: &Path, names: &[&str]) -> PathBuf {
    let pdf_dir = dir.join("pdf");
    fs::create_dir_all(&pdf_dir).unwrap();
    for name in names {
        fs::write(pdf_dir.join(name), b"%PDF-1.4").unwrap();
    }
    pdf_dir
}

/// The standard four-record corpus used by end-to-end tests.
pub fn standard_corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        ("doe2021", ARTICLE_2021),
        ("roe2020", ARTICLE_2020),
        ("team2019", SHARED_TASK),
        ("talk2022", TALK),
    ]
}

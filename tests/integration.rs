//! Integration tests using TOML fixtures.
//!
//! This test harness loads test cases from TOML files in the `fixtures/` directory,
//! runs each BibTeX snippet through parsing, normalization and rendering, and
//! compares the resulting HTML citation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

/// A test fixture loaded from a TOML file.
#[derive(Debug, Deserialize)]
struct Fixture {
    /// Name of the test case
    name: String,
    /// BibTeX source holding exactly one record
    bib: String,
    /// Expected rendered citation (for render tests)
    #[serde(default)]
    expected: Option<String>,
    /// Expected error message fragment (for error tests)
    #[serde(default)]
    expected_error: Option<String>,
}

/// Load all fixtures from a directory.
fn load_fixtures(dir: &Path) -> Vec<(String, Fixture)> {
    let mut fixtures = Vec::new();

    if !dir.exists() {
        return fixtures;
    }

    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();

        if path.extension().map_or(false, |e| e == "toml") {
            let content = fs::read_to_string(&path).unwrap();
            let fixture: Fixture = toml::from_str(&content).unwrap();
            let name = path.file_stem().unwrap().to_string_lossy().to_string();
            fixtures.push((name, fixture));
        }
    }

    fixtures
}

/// Parse, normalize and render the single record of a fixture.
fn render_fixture(fixture: &Fixture) -> Result<String, publist::RenderError> {
    let records = publist::parse_records(&fixture.bib, &publist::LoadOptions::default())
        .unwrap_or_else(|e| panic!("fixture '{}' is not valid BibTeX: {}", fixture.name, e));
    let records = publist::normalize_all(records);
    assert_eq!(records.len(), 1, "fixture '{}' must hold one record", fixture.name);

    let options = publist::RenderOptions {
        pdf_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/no-such-pdf-dir"),
        ..publist::RenderOptions::default()
    };
    publist::render_citation(&records[0], &options)
}

/// Run render tests - verify the full citation line.
fn run_render_test(name: &str, fixture: &Fixture) {
    match render_fixture(fixture) {
        Ok(html) => {
            if let Some(expected) = &fixture.expected {
                assert_eq!(html.trim(), expected.trim(), "Test '{}' output mismatch", name);
            }
        }
        Err(e) => panic!("Test '{}' failed with unexpected error: {}", name, e),
    }
}

/// Run error tests - verify proper error reporting.
fn run_error_test(name: &str, fixture: &Fixture) {
    match render_fixture(fixture) {
        Ok(html) => panic!("Test '{}' expected an error but rendered: {}", name, html),
        Err(e) => {
            if let Some(expected_error) = &fixture.expected_error {
                let error_msg = e.to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}' error mismatch: expected '{}', got '{}'",
                    name,
                    expected_error,
                    error_msg
                );
            }
        }
    }
}

#[test]
fn test_render_fixtures() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/render");
    let fixtures = load_fixtures(&fixtures_dir);
    assert!(!fixtures.is_empty(), "no render fixtures found");

    for (name, fixture) in fixtures {
        println!("Running render test: {}", fixture.name);
        run_render_test(&name, &fixture);
    }
}

#[test]
fn test_error_fixtures() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/errors");
    let fixtures = load_fixtures(&fixtures_dir);
    assert!(!fixtures.is_empty(), "no error fixtures found");

    for (name, fixture) in fixtures {
        println!("Running error test: {}", fixture.name);
        run_error_test(&name, &fixture);
    }
}

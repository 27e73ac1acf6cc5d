//! Serialization of the three output artifacts.
//!
//! Every function here builds the complete document in memory; writing it to
//! disk is left to the pipeline so that nothing is written before the whole
//! corpus has been rendered.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use crate::bibtex::write_entries;
use crate::classify::{sorted_by_date_desc, Category, ClassifyError};
use crate::record::Record;
use crate::render::{render_citation, RenderError, RenderOptions};

/// Width of the `%` rules framing a category banner.
const BANNER_WIDTH: usize = 60;

/// Columns that lead every row of the tabular export.
const LEADING_COLUMNS: [&str; 2] = ["ENTRYTYPE", "ID"];

/// Formats the "last update" date, e.g. "March 05, 2024".
pub fn format_footer_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Builds the tab-separated export: one row per record, one column per
/// field name seen in any record.
///
/// The first column is an unnamed 0-based row index. Missing cells are left
/// empty; cells holding a tab, quote or line break are quoted.
pub fn tsv_document(records: &[Record]) -> Result<String, csv::Error> {
    let field_names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.fields.keys().map(String::as_str))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    let mut header = vec![""];
    header.extend(LEADING_COLUMNS);
    header.extend(field_names.iter().copied());
    writer.write_record(&header)?;

    for (index, record) in records.iter().enumerate() {
        let mut row = vec![index.to_string(), record.entry_type.clone(), record.id.clone()];
        row.extend(
            field_names
                .iter()
                .map(|name| record.text(name).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// The comment banner heading one category block.
pub fn category_banner(key: &str) -> String {
    let rule = "%".repeat(BANNER_WIDTH);
    format!("{rule}\n% {key}\n{rule}\n")
}

/// Builds the re-serialized BibTeX file.
///
/// Category blocks appear in ascending key order; records inside a block are
/// most recent first.
pub fn bib_document(
    by_category: &BTreeMap<String, Vec<&Record>>,
) -> Result<String, ClassifyError> {
    let mut out = String::new();
    for (key, records) in by_category {
        out.push_str(&category_banner(key));
        let sorted = sorted_by_date_desc(records.iter().copied())?;
        out.push_str(&write_entries(sorted));
    }
    Ok(out)
}

/// Errors that can occur while building the HTML document.
#[derive(Error, Debug)]
pub enum HtmlError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Builds the HTML listing.
///
/// Every category gets a heading, even when it has no records; categories
/// missing from `sections` are rendered as empty lists.
pub fn html_document(
    sections: &BTreeMap<Category, Vec<&Record>>,
    options: &RenderOptions,
    today: NaiveDate,
) -> Result<String, HtmlError> {
    let mut out = String::from("<html>\n");

    for category in Category::ALL {
        out.push_str(&format!("<h3>{}</h3>\n", category.label()));
        out.push_str("<ul>\n");
        let records = sections.get(&category).map(Vec::as_slice).unwrap_or(&[]);
        for record in sorted_by_date_desc(records.iter().copied())? {
            out.push_str("<li> ");
            out.push_str(&render_citation(record, options)?);
            out.push('\n');
        }
        out.push_str("</ul>\n");
    }

    out.push_str("<footer>\n");
    out.push_str(&format!("last update: {}\n", format_footer_date(today)));
    out.push_str("</footer>\n");
    out.push_str("</html>");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::group_by_category;

    fn talk(id: &str, year: &str) -> Record {
        Record::new(id, "misc")
            .with_field("author", "Doe, Jane")
            .with_field("title", "A Talk")
            .with_field("howpublished", "Seminar")
            .with_field("year", year)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_format_footer_date() {
        assert_eq!(format_footer_date(date()), "March 05, 2024");
    }

    #[test]
    fn test_tsv_document_union_of_columns() {
        // Given: two records with different field sets
        let records = vec![
            Record::new("a", "article").with_field("year", "2020"),
            Record::new("b", "misc").with_field("url", "https://example.org"),
        ];

        // When: we export them
        let tsv = tsv_document(&records).unwrap();

        // Then: the header has every field and missing cells are empty
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "\tENTRYTYPE\tID\turl\tyear");
        assert_eq!(lines[1], "0\tarticle\ta\t\t2020");
        assert_eq!(lines[2], "1\tmisc\tb\thttps://example.org\t");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_tsv_document_quotes_special_cells() {
        // Given: values holding a quote and a tab
        let records = vec![Record::new("q", "misc")
            .with_field("note", "say \"hi\"")
            .with_field("title", "a\tb")
            .with_field("year", "2020")];

        // When: we export them
        let tsv = tsv_document(&records).unwrap();

        // Then: only those cells are quoted, quotes doubled
        assert_eq!(
            tsv,
            "\tENTRYTYPE\tID\tnote\ttitle\tyear\n0\tmisc\tq\t\"say \"\"hi\"\"\"\t\"a\tb\"\t2020\n"
        );
    }

    #[test]
    fn test_bib_document_blocks_and_order() {
        let records = vec![
            talk("old", "2019"),
            Record::new("art", "article").with_field("year", "2020"),
            talk("new", "2021"),
        ];
        let by_category = group_by_category(&records);

        let bib = bib_document(&by_category).unwrap();

        // Categories ascend, records inside descend by date
        let article = bib.find("% article\n").unwrap();
        let misc = bib.find("% misc\n").unwrap();
        assert!(article < misc);
        let new = bib.find("@misc{new,").unwrap();
        let old = bib.find("@misc{old,").unwrap();
        assert!(new < old);
        assert!(bib.starts_with(&format!("{}\n% article\n", "%".repeat(60))));
    }

    #[test]
    fn test_html_document_skeleton() {
        // Given: two talks and nothing else
        let records = vec![talk("t1", "2019"), talk("t2", "2022")];
        let mut sections = BTreeMap::new();
        sections.insert(Category::Misc, records.iter().collect::<Vec<_>>());

        // When: we build the page
        let html = html_document(&sections, &RenderOptions::default(), date()).unwrap();

        // Then: every heading appears in order and talks are newest first
        let mut last = 0;
        for category in Category::ALL {
            let pos = html.find(&format!("<h3>{}</h3>", category.label())).unwrap();
            assert!(pos >= last);
            last = pos;
        }
        assert!(html.find("bib/t2.bib").unwrap() < html.find("bib/t1.bib").unwrap());
        assert!(html.starts_with("<html>\n<h3>Journal Articles</h3>\n<ul>\n</ul>\n"));
        assert!(html.ends_with("<footer>\nlast update: March 05, 2024\n</footer>\n</html>"));
        assert_eq!(html.matches("<li> ").count(), 2);
    }

    #[test]
    fn test_html_document_propagates_render_errors() {
        let broken = Record::new("broken", "misc").with_field("year", "2020");
        let mut sections = BTreeMap::new();
        sections.insert(Category::Misc, vec![&broken]);

        let result = html_document(&sections, &RenderOptions::default(), date());

        assert!(matches!(
            result,
            Err(HtmlError::Render(RenderError::MissingField { .. }))
        ));
    }
}

//! Grouping and ordering of records.
//!
//! Records are grouped either by presentation category or by date. Grouping
//! is a stable partition: within a group, records keep their input order.

use std::collections::BTreeMap;
use std::convert::Infallible;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::record::Record;

/// Errors that can occur while classifying records.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("record '{id}' has neither a 'date' nor a 'year' field")]
    MissingDate { id: String },
}

/// Category key assigned to shared-task papers regardless of entry type.
pub const SHARED_TASK_KEY: &str = "sharedtask";

static SHARED_TASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)shared[\s-]?task").expect("valid regex"));

/// Presentation category of a record.
///
/// Variants are declared in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Article,
    Book,
    Proceedings,
    InProceedings,
    InCollection,
    SharedTask,
    Misc,
}

impl Category {
    /// All categories, in presentation order.
    pub const ALL: [Category; 7] = [
        Category::Article,
        Category::Book,
        Category::Proceedings,
        Category::InProceedings,
        Category::InCollection,
        Category::SharedTask,
        Category::Misc,
    ];

    /// The grouping key this category is produced from.
    pub fn key(self) -> &'static str {
        match self {
            Category::Article => "article",
            Category::Book => "book",
            Category::Proceedings => "proceedings",
            Category::InProceedings => "inproceedings",
            Category::InCollection => "incollection",
            Category::SharedTask => SHARED_TASK_KEY,
            Category::Misc => "misc",
        }
    }

    /// Section heading for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Article => "Journal Articles",
            Category::Book => "Edited Volumes",
            Category::Proceedings => "Edited Conference Proceedings",
            Category::InProceedings => "Articles in Conference Proceedings",
            Category::InCollection => "Articles in Collections",
            Category::SharedTask => "Shared Tasks",
            Category::Misc => "Talks and Presentations",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// How [`group_records`] partitions its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    ByCategory,
    ByDate,
}

/// Returns true if the record's note marks it as a shared-task paper.
pub fn is_shared_task(record: &Record) -> bool {
    record
        .text("note")
        .map(|note| SHARED_TASK.is_match(&note))
        .unwrap_or(false)
}

/// Category key of a record: its entry type, unless it is a shared-task paper.
pub fn category_key(record: &Record) -> String {
    if is_shared_task(record) {
        SHARED_TASK_KEY.to_string()
    } else {
        record.entry_type.clone()
    }
}

/// Date key of a record: its `date` field, falling back to `year`.
pub fn date_key(record: &Record) -> Result<String, ClassifyError> {
    record
        .text("date")
        .or_else(|| record.text("year"))
        .ok_or_else(|| ClassifyError::MissingDate {
            id: record.id.clone(),
        })
}

/// Groups records by key. Keys iterate in ascending order; callers that
/// need most-recent-first iterate date groups in reverse.
pub fn group_records<'a, I>(
    records: I,
    ordering: Ordering,
) -> Result<BTreeMap<String, Vec<&'a Record>>, ClassifyError>
where
    I: IntoIterator<Item = &'a Record>,
{
    partition(records, |record| match ordering {
        Ordering::ByCategory => Ok(category_key(record)),
        Ordering::ByDate => date_key(record),
    })
}

/// Groups records by category key.
pub fn group_by_category<'a, I>(records: I) -> BTreeMap<String, Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    match partition(records, |record| Ok::<_, Infallible>(category_key(record))) {
        Ok(groups) => groups,
        Err(never) => match never {},
    }
}

fn partition<'a, I, E>(
    records: I,
    mut key: impl FnMut(&Record) -> Result<String, E>,
) -> Result<BTreeMap<String, Vec<&'a Record>>, E>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<String, Vec<&'a Record>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)?).or_default().push(record);
    }
    Ok(groups)
}

/// Groups records by date key.
pub fn group_by_date<'a, I>(records: I) -> Result<BTreeMap<String, Vec<&'a Record>>, ClassifyError>
where
    I: IntoIterator<Item = &'a Record>,
{
    group_records(records, Ordering::ByDate)
}

/// Flattens records into most-recent-first order; ties keep input order.
pub fn sorted_by_date_desc<'a, I>(records: I) -> Result<Vec<&'a Record>, ClassifyError>
where
    I: IntoIterator<Item = &'a Record>,
{
    Ok(group_by_date(records)?
        .into_values()
        .rev()
        .flatten()
        .collect())
}

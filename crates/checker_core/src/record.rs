use std::fmt;

use crate::Category;

/// Canonical string identity of one portal item, used for exact-equality
/// comparison against history. One record per history-file line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record(String);

impl Record {
    pub fn new(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scanned row had fewer cells than its category's template needs.
/// Callers skip or report the row; they must not index past the end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {category} row: {actual} cells, at least {required} required")]
pub struct MalformedRow {
    pub category: Category,
    pub required: usize,
    pub actual: usize,
}

/// Build the canonical record for one table row.
///
/// Each source field is trimmed of surrounding whitespace before being
/// substituted into the category template; nothing else is normalized,
/// so two rows compare equal only when their used cells match exactly.
pub fn extract_record(category: Category, cells: &[String]) -> Result<Record, MalformedRow> {
    let required = category.required_cells();
    if cells.len() < required {
        return Err(MalformedRow {
            category,
            required,
            actual: cells.len(),
        });
    }

    let line = match category {
        Category::Messages => {
            let from = cells[1].trim();
            let expiration = cells[4].trim();
            let subject = cells[5].trim();
            format!("Subject: {subject}; From: {from}; Expires: {expiration}")
        }
        Category::Charges => {
            let due = cells[0].trim();
            let amount = cells[1].trim();
            format!("${amount} due {due}")
        }
    };
    Ok(Record(line))
}

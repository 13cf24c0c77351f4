//! Section parser for bill history modals.
//!
//! A modal is a flat list of table rows. The fixed sections (bill number,
//! titles, abstract, filing date, significance) are consumed from the front
//! of a deque cursor in a fixed order; whatever is left holds the action
//! history, which is read from the back up to the `ACTIONS TAKEN` marker.

use std::collections::VecDeque;
use std::fmt;

use hrep_api::types::{BillHistory, Significance, UnknownSignificance};
use hrep_api::{extract_rows, RowUnit};
use tracing::debug;

use crate::clean::clean_text;

/// Marks the boundary between the fixed sections and the action history.
pub const END_MARKER: &str = "ACTIONS TAKEN";

/// Label rows that carry no value of their own.
const LABEL_PREFIXES: &[&str] = &["PRINCIPAL AUTHOR", "CO-AUTHOR"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing required section: {field}")]
    MissingSection { field: Field },
    #[error(transparent)]
    UnknownSignificance(#[from] UnknownSignificance),
}

/// A single row whose text could not be read. Never fatal on its own.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("row has no readable cell")]
pub struct ExtractionError;

/// Fields filled from the fixed sections of a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BillNum,
    Title,
    ShortTitle,
    Abstract,
    DateFiled,
    Significance,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::BillNum => "billNum",
            Field::Title => "title",
            Field::ShortTitle => "shortTitle",
            Field::Abstract => "abstract",
            Field::DateFiled => "dateFiled",
            Field::Significance => "significance",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a row is recognized as the start of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    /// Cleaned text starts with the literal.
    Prefix(&'static str),
    /// The row carries bold markup; no text check.
    Emphasized,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionDescriptor {
    pub field: Field,
    pub recognition: Recognition,
    /// Everything up to and including the first occurrence is the label.
    pub delimiter: char,
    pub optional: bool,
}

/// Sections in the order they appear in a modal.
pub const SECTIONS: [SectionDescriptor; 6] = [
    SectionDescriptor {
        field: Field::BillNum,
        recognition: Recognition::Emphasized,
        delimiter: '.',
        optional: false,
    },
    SectionDescriptor {
        field: Field::Title,
        recognition: Recognition::Prefix("FULL TITLE"),
        delimiter: ':',
        optional: false,
    },
    SectionDescriptor {
        field: Field::ShortTitle,
        recognition: Recognition::Prefix("SHORT TITLE"),
        delimiter: ':',
        optional: true,
    },
    SectionDescriptor {
        field: Field::Abstract,
        recognition: Recognition::Prefix("ABSTRACT"),
        delimiter: ':',
        optional: true,
    },
    SectionDescriptor {
        field: Field::DateFiled,
        recognition: Recognition::Prefix("DATE FILED"),
        delimiter: ':',
        optional: false,
    },
    SectionDescriptor {
        field: Field::Significance,
        recognition: Recognition::Prefix("SIGNIFICANCE"),
        delimiter: ':',
        optional: false,
    },
];

impl SectionDescriptor {
    fn matches(&self, row: &RowUnit, text: &str) -> bool {
        match self.recognition {
            Recognition::Prefix(prefix) => text.starts_with(prefix),
            Recognition::Emphasized => row.is_emphasized(),
        }
    }

    /// Drops the label up to the delimiter. Text without the delimiter is
    /// kept whole.
    fn value<'t>(&self, text: &'t str) -> &'t str {
        let value = match text.find(self.delimiter) {
            Some(idx) => &text[idx + self.delimiter.len_utf8()..],
            None => text,
        };
        value.trim()
    }
}

/// Reads and cleans the text of one row.
pub fn extract_text(row: &RowUnit) -> Result<String, ExtractionError> {
    row.raw_text().map(clean_text).ok_or(ExtractionError)
}

/// Parses the rows of one history modal into a complete record.
pub fn parse_bill_history(rows: &[RowUnit]) -> Result<BillHistory, ParseError> {
    let mut cursor: VecDeque<&RowUnit> = rows.iter().collect();
    let mut found = FoundSections::default();

    for section in &SECTIONS {
        match scan_section(&mut cursor, section) {
            Some(value) => found.set(section.field, value)?,
            None if section.optional => {}
            None => {
                return Err(ParseError::MissingSection {
                    field: section.field,
                })
            }
        }
    }

    let committee_referrals = collect_actions(cursor);
    found.into_history(committee_referrals)
}

/// Convenience for saved or freshly fetched modal markup.
pub fn parse_history_html(html: &str) -> Result<BillHistory, ParseError> {
    parse_bill_history(&extract_rows(html))
}

fn scan_section(cursor: &mut VecDeque<&RowUnit>, section: &SectionDescriptor) -> Option<String> {
    while let Some(row) = cursor.pop_front() {
        let text = match extract_text(row) {
            Ok(text) => text,
            Err(err) => {
                debug!(field = %section.field, "skipping row: {}", err);
                continue;
            }
        };

        if section.matches(row, &text) {
            return Some(section.value(&text).to_string());
        }

        if section.optional {
            // The row belongs to a later section.
            cursor.push_front(row);
            return None;
        }

        debug!(field = %section.field, row = %text, "discarding row");
    }
    None
}

/// Reads the action history from the back of the remaining rows.
///
/// A marker row closing the list is dropped first; collection then stops at
/// the next marker found walking backwards. Blank and label rows are noise.
fn collect_actions(remainder: VecDeque<&RowUnit>) -> Vec<String> {
    let mut texts: Vec<String> = remainder
        .into_iter()
        .filter_map(|row| match extract_text(row) {
            Ok(text) => Some(text),
            Err(err) => {
                debug!("skipping action row: {}", err);
                None
            }
        })
        .collect();

    while texts.last().is_some_and(|text| text.is_empty()) {
        texts.pop();
    }
    if texts.last().is_some_and(|text| is_end_marker(text)) {
        texts.pop();
    }

    let mut actions = Vec::new();
    while let Some(text) = texts.pop() {
        if is_end_marker(&text) {
            break;
        }
        if text.is_empty() || is_label_row(&text) {
            continue;
        }
        actions.push(text);
    }
    actions.reverse();
    actions
}

fn is_end_marker(text: &str) -> bool {
    text.starts_with(END_MARKER)
}

fn is_label_row(text: &str) -> bool {
    let upper = text.to_uppercase();
    LABEL_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}

#[derive(Default)]
struct FoundSections {
    bill_num: Option<String>,
    title: Option<String>,
    short_title: Option<String>,
    r#abstract: Option<String>,
    date_filed: Option<String>,
    significance: Option<Significance>,
}

impl FoundSections {
    fn set(&mut self, field: Field, value: String) -> Result<(), ParseError> {
        match field {
            // The label ends in a period; some rows end in one as well.
            Field::BillNum => self.bill_num = Some(value.trim_end_matches('.').trim().to_string()),
            Field::Title => self.title = Some(value),
            Field::ShortTitle => self.short_title = non_empty(value),
            Field::Abstract => self.r#abstract = non_empty(value),
            Field::DateFiled => self.date_filed = Some(value),
            Field::Significance => self.significance = Some(value.parse()?),
        }
        Ok(())
    }

    fn into_history(self, committee_referrals: Vec<String>) -> Result<BillHistory, ParseError> {
        let missing = |field| ParseError::MissingSection { field };
        Ok(BillHistory {
            bill_num: self.bill_num.ok_or_else(|| missing(Field::BillNum))?,
            title: self.title.ok_or_else(|| missing(Field::Title))?,
            short_title: self.short_title,
            r#abstract: self.r#abstract,
            date_filed: self.date_filed.ok_or_else(|| missing(Field::DateFiled))?,
            significance: self
                .significance
                .ok_or_else(|| missing(Field::Significance))?,
            committee_referrals,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

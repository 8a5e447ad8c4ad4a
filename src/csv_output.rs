//! CSV and TSV output for statement and note streams
//!
//! Rows are written as records arrive, header first. With hyperlinks on,
//! the compatKey cell becomes a spreadsheet `=HYPERLINK(...)` formula when
//! the feature has an MDN URL.

use crate::denylist::DenylistHit;
use crate::near_duplicates::NearDuplicateGroup;
use crate::record::{Note, Statement, StatementFields};
use crate::stats::{BrowserStats, StatsTracker};
use std::io::{self, Write};

const STATEMENT_COLUMNS: &[&str] = &[
    "statementId",
    "compatKey",
    "browser",
    "nameVariant",
    "flagged",
    "version_added",
    "version_removed",
    "partial_implementation",
    "notesCount",
    "description",
    "mdn_url",
];

const NOTE_COLUMNS: &[&str] = &[
    "statementId",
    "compatKey",
    "browser",
    "nameVariant",
    "flagged",
    "version_added",
    "version_removed",
    "partial_implementation",
    "description",
    "mdn_url",
    "note",
];

/// Field separator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

/// Streaming CSV/TSV writer
#[derive(Debug)]
pub struct CsvOutput<W: Write> {
    writer: W,
    delimiter: Delimiter,
    hyperlinks: bool,
}

impl<W: Write> CsvOutput<W> {
    pub fn new(writer: W, delimiter: Delimiter, hyperlinks: bool) -> Self {
        Self {
            writer,
            delimiter,
            hyperlinks,
        }
    }

    pub fn write_statement_header(&mut self) -> io::Result<()> {
        self.write_row(STATEMENT_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    pub fn write_note_header(&mut self) -> io::Result<()> {
        self.write_row(NOTE_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    pub fn write_statement(&mut self, statement: &Statement) -> io::Result<()> {
        let mut fields = self.leading_fields(&statement.fields);
        fields.push(statement.notes_count.to_string());
        fields.extend(Self::trailing_fields(&statement.fields));
        self.write_row(fields)
    }

    pub fn write_note(&mut self, note: &Note) -> io::Result<()> {
        let mut fields = self.leading_fields(&note.fields);
        fields.extend(Self::trailing_fields(&note.fields));
        fields.push(note.note.clone());
        self.write_row(fields)
    }

    /// Statistics table: one row per browser plus a total row
    pub fn write_stats(&mut self, tracker: &StatsTracker) -> io::Result<()> {
        self.write_row(
            [
                "browser",
                "statements",
                "flagged",
                "partial",
                "variants",
                "removed",
                "with_notes",
                "notes",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        )?;
        for (browser, stats) in tracker.per_browser() {
            self.write_row(Self::stats_fields(browser, stats))?;
        }
        self.write_row(Self::stats_fields("total", &tracker.totals()))
    }

    fn stats_fields(label: &str, stats: &BrowserStats) -> Vec<String> {
        vec![
            label.to_string(),
            stats.statements.to_string(),
            stats.flagged.to_string(),
            stats.partial.to_string(),
            stats.variants.to_string(),
            stats.removed.to_string(),
            stats.with_notes.to_string(),
            stats.notes.to_string(),
        ]
    }

    /// One row per (anchor, match) pair
    pub fn write_near_duplicates(&mut self, groups: &[NearDuplicateGroup]) -> io::Result<()> {
        self.write_row(vec![
            "anchor".to_string(),
            "distance".to_string(),
            "text".to_string(),
        ])?;
        for group in groups {
            for m in &group.matches {
                self.write_row(vec![
                    group.anchor.clone(),
                    m.distance.to_string(),
                    m.text.clone(),
                ])?;
            }
        }
        Ok(())
    }

    pub fn write_denylist_hits(&mut self, hits: &[DenylistHit]) -> io::Result<()> {
        self.write_row(
            ["statementId", "compatKey", "browser", "term", "reason", "note"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        )?;
        for hit in hits {
            self.write_row(vec![
                hit.statement_id.clone(),
                hit.compat_key.clone(),
                hit.browser.clone(),
                hit.term.clone(),
                hit.reason.clone().unwrap_or_default(),
                hit.note.clone(),
            ])?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn leading_fields(&self, fields: &StatementFields) -> Vec<String> {
        let compat_key = match (self.hyperlinks, fields.mdn_url.as_deref()) {
            (true, Some(url)) => hyperlink(url, &fields.compat_key),
            _ => fields.compat_key.clone(),
        };
        vec![
            fields.statement_id.clone(),
            compat_key,
            fields.browser.clone(),
            fields.name_variant.clone().unwrap_or_default(),
            fields.flagged.to_string(),
            fields
                .version_added
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            fields.version_removed.to_string(),
            fields.partial_implementation.to_string(),
        ]
    }

    fn trailing_fields(fields: &StatementFields) -> Vec<String> {
        vec![
            fields.description.clone().unwrap_or_default(),
            fields.mdn_url.clone().unwrap_or_default(),
        ]
    }

    fn write_row(&mut self, fields: Vec<String>) -> io::Result<()> {
        let delimiter = self.delimiter;
        let row: Vec<String> = fields
            .iter()
            .map(|field| escape_field(field, delimiter))
            .collect();
        writeln!(
            self.writer,
            "{}",
            row.join(&delimiter.as_char().to_string())
        )
    }
}

/// Escape one field for the given delimiter
///
/// CSV quotes fields containing the delimiter, a quote, CR or LF and doubles
/// inner quotes. TSV has no quoting; tabs and line breaks become spaces.
pub fn escape_field(field: &str, delimiter: Delimiter) -> String {
    match delimiter {
        Delimiter::Comma => {
            if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field.to_string()
            }
        }
        Delimiter::Tab => field.replace(|c: char| matches!(c, '\t' | '\n' | '\r'), " "),
    }
}

/// Spreadsheet hyperlink formula
pub fn hyperlink(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\",\"{}\")",
        url.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

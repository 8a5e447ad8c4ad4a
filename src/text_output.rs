//! Human-readable text output

use crate::denylist::DenylistHit;
use crate::near_duplicates::NearDuplicateGroup;
use crate::record::{Note, Statement, StatementFields};

fn version_summary(fields: &StatementFields) -> String {
    let added = fields
        .version_added
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "?".to_string());
    let mut summary = format!("added={}", added);
    if !fields.version_removed.is_false() {
        summary.push_str(&format!(" removed={}", fields.version_removed));
    }
    if let Some(variant) = &fields.name_variant {
        summary.push_str(&format!(" as={}", variant));
    }
    if fields.flagged {
        summary.push_str(" flagged");
    }
    if fields.partial_implementation {
        summary.push_str(" partial");
    }
    summary
}

/// `api.Foo.safari.1  added=9 partial  (2 notes)`
pub fn format_statement(statement: &Statement) -> String {
    let mut line = format!(
        "{}  {}",
        statement.fields.statement_id,
        version_summary(&statement.fields)
    );
    match statement.notes_count {
        0 => {}
        1 => line.push_str("  (1 note)"),
        n => line.push_str(&format!("  ({} notes)", n)),
    }
    line
}

/// `api.Foo.safari.1: Partial support.`
pub fn format_note(note: &Note) -> String {
    format!("{}: {}", note.fields.statement_id, note.note)
}

pub fn format_near_duplicates(groups: &[NearDuplicateGroup]) -> String {
    if groups.is_empty() {
        return "No near-duplicate notes found.\n".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let label = if group.matches.len() == 1 {
            "near-duplicate"
        } else {
            "near-duplicates"
        };
        out.push_str(&format!(
            "{:?} ({} {}):\n",
            group.anchor,
            group.matches.len(),
            label
        ));
        for m in &group.matches {
            out.push_str(&format!("  {:>3}  {:?}\n", m.distance, m.text));
        }
    }
    out
}

pub fn format_denylist_hits(hits: &[DenylistHit]) -> String {
    if hits.is_empty() {
        return "No denylisted notes found.\n".to_string();
    }

    let mut out = String::new();
    for hit in hits {
        out.push_str(&format!("{}  [{}]", hit.statement_id, hit.term));
        if let Some(reason) = &hit.reason {
            out.push_str(&format!(" {}", reason));
        }
        out.push_str(&format!("\n  {}\n", hit.note));
    }
    out.push_str(&format!("{} hits\n", hits.len()));
    out
}

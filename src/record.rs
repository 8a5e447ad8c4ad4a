//! Canonical Statement and Note records
//!
//! Every raw statement produced by the walk is normalized once into
//! [`StatementFields`]; a [`Statement`] adds the note count and a [`Note`]
//! adds one note text.

use crate::error::{CompatError, Result};
use crate::source::VersionValue;
use crate::traversal::WalkRecord;
use serde::Serialize;

/// Fields shared by statements and notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFields {
    /// `{compatKey}.{browser}.{index}`
    #[serde(rename = "statementId")]
    pub statement_id: String,
    #[serde(rename = "compatKey")]
    pub compat_key: String,
    pub description: Option<String>,
    pub mdn_url: Option<String>,
    pub browser: String,
    #[serde(rename = "nameVariant")]
    pub name_variant: Option<String>,
    pub flagged: bool,
    pub version_added: Option<VersionValue>,
    pub version_removed: VersionValue,
    pub partial_implementation: bool,
}

/// One (feature, browser, variant) support record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    #[serde(flatten)]
    pub fields: StatementFields,
    #[serde(rename = "notesCount")]
    pub notes_count: usize,
}

/// One note text attached to a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    #[serde(flatten)]
    pub fields: StatementFields,
    pub note: String,
}

impl StatementFields {
    pub fn from_walk(record: &WalkRecord) -> Result<Self> {
        let raw = &record.statement;
        let statement_id = format!("{}.{}.{}", record.compat_key, raw.browser, record.index);
        let name_variant = name_variant(
            raw.prefix.as_deref(),
            raw.alternative_name.as_deref(),
            raw.feature_id.as_deref(),
        )
        .ok_or_else(|| CompatError::MissingFeatureReference {
            statement_id: statement_id.clone(),
            prefix: raw.prefix.clone().unwrap_or_default(),
        })?;

        Ok(Self {
            statement_id,
            compat_key: record.compat_key.clone(),
            description: record.description.clone(),
            mdn_url: record.mdn_url.clone(),
            browser: raw.browser.clone(),
            name_variant,
            flagged: raw.is_flagged(),
            version_added: raw.version_added.clone(),
            version_removed: raw.version_removed.clone().unwrap_or_default(),
            partial_implementation: raw.partial_implementation,
        })
    }
}

impl Statement {
    pub fn from_walk(record: &WalkRecord) -> Result<Self> {
        Ok(Self {
            fields: StatementFields::from_walk(record)?,
            notes_count: record.statement.note_texts().len(),
        })
    }
}

impl Note {
    /// One note per normalized note text, in source order
    pub fn from_walk(record: &WalkRecord) -> Result<Vec<Self>> {
        let fields = StatementFields::from_walk(record)?;
        Ok(record
            .statement
            .note_texts()
            .into_iter()
            .map(|note| Note {
                fields: fields.clone(),
                note: note.to_string(),
            })
            .collect())
    }
}

/// Derive the name a variant is shipped under.
///
/// Returns `None` when a prefix needs the owning feature id and there is none;
/// `Some(None)` when the statement is not a variant at all.
pub fn name_variant(
    prefix: Option<&str>,
    alternative_name: Option<&str>,
    feature_id: Option<&str>,
) -> Option<Option<String>> {
    match (prefix, alternative_name) {
        (None, None) => Some(None),
        (_, Some(alternative)) => Some(Some(alternative.to_string())),
        (Some(prefix), None) => {
            let feature_id = feature_id?;
            Some(Some(format!("{}{}", prefix, leaf_segment(feature_id))))
        }
    }
}

/// Last segment of a feature id, split on `/` or `.`
pub fn leaf_segment(feature_id: &str) -> &str {
    feature_id
        .rsplit(|c: char| c == '/' || c == '.')
        .next()
        .unwrap_or(feature_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawNotes, RawStatement};

    fn walk_record(statement: RawStatement) -> WalkRecord {
        WalkRecord {
            compat_key: "api.Foo".to_string(),
            mdn_url: Some("https://developer.mozilla.org/docs/Web/API/Foo".to_string()),
            description: None,
            index: 3,
            statement,
        }
    }

    fn raw(browser: &str) -> RawStatement {
        RawStatement {
            browser: browser.to_string(),
            feature_id: Some("api.Foo".to_string()),
            version_added: Some(VersionValue::Text("10".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_variant_table() {
        let cases = [
            (None, None, Some("a.b.c"), None),
            (None, Some("Foo"), Some("a.b.c"), Some("Foo")),
            (Some("-webkit-"), None, Some("a.b.c"), Some("-webkit-c")),
            (Some("-webkit-"), Some("Foo"), Some("a.b.c"), Some("Foo")),
            (
                Some("moz"),
                None,
                Some("api/Window/requestAnimationFrame"),
                Some("mozrequestAnimationFrame"),
            ),
        ];

        for (prefix, alt, feature_id, expected) in cases {
            assert_eq!(
                name_variant(prefix, alt, feature_id),
                Some(expected.map(str::to_string)),
                "prefix={:?} alt={:?}",
                prefix,
                alt
            );
        }
    }

    #[test]
    fn test_name_variant_prefix_without_feature() {
        assert_eq!(name_variant(Some("webkit"), None, None), None);
        // alternative_name wins, so the missing feature does not matter
        assert_eq!(
            name_variant(Some("webkit"), Some("Bar"), None),
            Some(Some("Bar".to_string()))
        );
    }

    #[test]
    fn test_leaf_segment() {
        assert_eq!(leaf_segment("a.b.c"), "c");
        assert_eq!(leaf_segment("a/b/c"), "c");
        assert_eq!(leaf_segment("single"), "single");
    }

    #[test]
    fn test_statement_from_walk() {
        let mut stmt = raw("safari");
        stmt.notes = Some(RawNotes::Many(vec!["a".to_string(), "b".to_string()]));
        stmt.partial_implementation = true;

        let statement = Statement::from_walk(&walk_record(stmt)).unwrap();
        assert_eq!(statement.fields.statement_id, "api.Foo.safari.3");
        assert_eq!(statement.fields.browser, "safari");
        assert_eq!(statement.fields.version_removed, VersionValue::Bool(false));
        assert!(statement.fields.partial_implementation);
        assert!(!statement.fields.flagged);
        assert_eq!(statement.fields.name_variant, None);
        assert_eq!(statement.notes_count, 2);
    }

    #[test]
    fn test_notes_from_walk() {
        let mut stmt = raw("chrome");
        stmt.notes = Some(RawNotes::One("Only on Windows.".to_string()));
        let notes = Note::from_walk(&walk_record(stmt)).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note, "Only on Windows.");
        assert_eq!(notes[0].fields.statement_id, "api.Foo.chrome.3");

        assert!(Note::from_walk(&walk_record(raw("chrome"))).unwrap().is_empty());
    }

    #[test]
    fn test_missing_feature_reference_is_fatal() {
        let mut stmt = raw("chrome");
        stmt.prefix = Some("webkit".to_string());
        stmt.feature_id = None;
        let err = Statement::from_walk(&walk_record(stmt)).unwrap_err();
        assert!(matches!(
            err,
            CompatError::MissingFeatureReference { ref statement_id, .. } if statement_id == "api.Foo.chrome.3"
        ));
    }

    #[test]
    fn test_statement_json_field_names() {
        let statement = Statement::from_walk(&walk_record(raw("chrome"))).unwrap();
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["statementId"], "api.Foo.chrome.3");
        assert_eq!(json["compatKey"], "api.Foo");
        assert_eq!(json["version_added"], "10");
        assert_eq!(json["version_removed"], false);
        assert_eq!(json["notesCount"], 0);
        assert!(json["nameVariant"].is_null());
    }
}

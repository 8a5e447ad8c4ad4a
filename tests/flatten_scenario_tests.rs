//! End-to-end flattening over the sample compat dataset
//!
//! Exercises the library API directly: traversal, statement and note
//! streams, and near-duplicate clustering on the notes they produce.

use compatscan::near_duplicates::{find_near_duplicates, try_find_near_duplicates};
use compatscan::source::{BcdSource, SupportSource, VersionValue};
use compatscan::stats::StatsTracker;
use compatscan::{CompatError, Note, Statement, Traversal, TraversalConfig};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bcd_sample.json")
}

fn sample() -> BcdSource {
    BcdSource::from_path(fixture_path()).expect("fixture loads")
}

fn statements(traversal: &Traversal<'_, BcdSource>) -> Vec<Statement> {
    traversal
        .statements()
        .collect::<Result<Vec<_>, _>>()
        .expect("sample data is well formed")
}

fn notes(traversal: &Traversal<'_, BcdSource>) -> Vec<Note> {
    traversal
        .notes()
        .collect::<Result<Vec<_>, _>>()
        .expect("sample data is well formed")
}

#[test]
fn test_single_feature_two_browsers() {
    let source = BcdSource::from_value(json!({
        "api": {
            "Foo": {
                "__compat": {
                    "mdn_url": "https://developer.mozilla.org/docs/Web/API/Foo",
                    "support": {
                        "chrome": { "version_added": "10" },
                        "safari": {
                            "version_added": "9",
                            "notes": ["Partial support.", "partial support"]
                        }
                    }
                }
            }
        }
    }))
    .unwrap();
    let traversal = Traversal::new(&source, TraversalConfig::with_browsers(["chrome", "safari"]));

    let statements = statements(&traversal);
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].fields.statement_id, "api.Foo.chrome.0");
    assert_eq!(statements[0].notes_count, 0);
    assert_eq!(statements[1].fields.statement_id, "api.Foo.safari.1");
    assert_eq!(statements[1].notes_count, 2);
    assert_eq!(
        statements[1].fields.version_added,
        Some(VersionValue::Text("9".to_string()))
    );

    let notes = notes(&traversal);
    assert_eq!(notes.len(), 2);
    assert!(notes
        .iter()
        .all(|n| n.fields.statement_id == "api.Foo.safari.1"));

    let groups = find_near_duplicates(&notes, "safari", 5);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].anchor, "Partial support.");
    assert_eq!(groups[0].matches[0].text, "partial support");
    assert_eq!(groups[1].anchor, "partial support");
    assert_eq!(groups[1].matches[0].text, "Partial support.");
    assert_eq!(groups[0].matches[0].distance, groups[1].matches[0].distance);
}

#[test]
fn test_sample_statement_ids() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());

    let ids: Vec<String> = statements(&traversal)
        .into_iter()
        .map(|s| s.fields.statement_id)
        .collect();
    assert_eq!(
        ids,
        vec![
            "api.Foo.chrome.0",
            "api.Foo.safari.1",
            "api.Foo.bar.chrome.0",
            "api.Foo.bar.chrome.1",
            "api.Foo.bar.firefox.2",
            "api.Foo.bar.safari.3",
            "api.Foo.baz.firefox.0",
            "webextensions.api.tabs.firefox.0",
        ]
    );
}

#[test]
fn test_sample_statement_fields() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());
    let statements = statements(&traversal);

    let foo = &statements[1].fields;
    assert_eq!(foo.compat_key, "api.Foo");
    assert_eq!(foo.description.as_deref(), Some("The Foo interface"));
    assert!(foo.partial_implementation);

    let prefixed = &statements[3].fields;
    assert_eq!(prefixed.name_variant.as_deref(), Some("webkitbar"));
    assert_eq!(prefixed.version_removed, VersionValue::Text("20".to_string()));

    let flagged = &statements[4].fields;
    assert!(flagged.flagged);
    assert_eq!(flagged.version_removed, VersionValue::Bool(false));

    let unsupported = &statements[5].fields;
    assert_eq!(unsupported.version_added, Some(VersionValue::Bool(false)));
    assert_eq!(statements[5].notes_count, 0);

    let alternative = &statements[6].fields;
    assert_eq!(alternative.name_variant.as_deref(), Some("mozBaz"));
}

#[test]
fn test_note_count_matches_statement_counts() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());

    let mut per_statement: HashMap<String, usize> = HashMap::new();
    for note in notes(&traversal) {
        *per_statement.entry(note.fields.statement_id).or_default() += 1;
    }

    let statements = statements(&traversal);
    for statement in &statements {
        assert_eq!(
            statement.notes_count,
            per_statement
                .get(&statement.fields.statement_id)
                .copied()
                .unwrap_or(0),
            "notesCount mismatch for {}",
            statement.fields.statement_id
        );
    }
    assert_eq!(per_statement.get("api.Foo.safari.1"), Some(&2));
    assert_eq!(per_statement.values().sum::<usize>(), 5);
}

#[test]
fn test_stats_rows_follow_tracked_order() {
    let source = sample();
    let config = TraversalConfig::with_browsers(["chrome", "firefox", "safari"]);
    let traversal = Traversal::new(&source, config.clone());

    let mut tracker = StatsTracker::with_browsers(&config.browsers);
    for statement in statements(&traversal) {
        tracker.record_statement(&statement);
    }

    let rows: Vec<(&str, u64)> = tracker
        .per_browser()
        .iter()
        .map(|(browser, stats)| (*browser, stats.statements))
        .collect();
    assert_eq!(rows, vec![("chrome", 3), ("firefox", 3), ("safari", 2)]);
}

#[test]
fn test_stats_rows_include_tracked_browsers_without_data() {
    let source = sample();
    let config = TraversalConfig::default();
    let traversal = Traversal::new(&source, config.clone());

    let mut tracker = StatsTracker::with_browsers(&config.browsers);
    for statement in statements(&traversal) {
        tracker.record_statement(&statement);
    }

    let order: Vec<&str> = tracker.per_browser().iter().map(|(b, _)| *b).collect();
    assert_eq!(order, config.browsers);
    assert_eq!(tracker.get("edge").map(|s| s.statements), Some(0));
}

#[test]
fn test_statement_ids_are_unique() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());

    let statements = statements(&traversal);
    let unique: HashSet<&str> = statements
        .iter()
        .map(|s| s.fields.statement_id.as_str())
        .collect();
    assert_eq!(unique.len(), statements.len());
}

#[test]
fn test_every_note_belongs_to_a_statement() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());

    let ids: HashSet<String> = statements(&traversal)
        .into_iter()
        .map(|s| s.fields.statement_id)
        .collect();
    for note in notes(&traversal) {
        assert!(ids.contains(&note.fields.statement_id));
    }
}

#[test]
fn test_walks_are_deterministic() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());

    assert_eq!(statements(&traversal), statements(&traversal));
    assert_eq!(notes(&traversal), notes(&traversal));
}

#[test]
fn test_excluded_prefix_drops_subtree() {
    let source = sample();
    let traversal = Traversal::new(
        &source,
        TraversalConfig::default().exclude_prefix("webextensions"),
    );

    let statements = statements(&traversal);
    assert_eq!(statements.len(), 7);
    assert!(statements
        .iter()
        .all(|s| !s.fields.compat_key.starts_with("webextensions")));
}

#[test]
fn test_untracked_browser_is_skipped() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::with_browsers(["safari"]));

    let ids: Vec<String> = statements(&traversal)
        .into_iter()
        .map(|s| s.fields.statement_id)
        .collect();
    assert_eq!(ids, vec!["api.Foo.safari.0", "api.Foo.bar.safari.0"]);
}

#[test]
fn test_near_duplicates_per_browser() {
    let source = sample();
    let traversal = Traversal::new(&source, TraversalConfig::default());

    let firefox = try_find_near_duplicates(traversal.notes(), "firefox", 5).unwrap();
    assert_eq!(firefox.len(), 2);
    assert_eq!(firefox[0].anchor, "Behind a pref.");
    assert_eq!(firefox[0].matches[0].text, "Behind a prefs.");
    assert_eq!(firefox[0].matches[0].distance, 1);

    let chrome = try_find_near_duplicates(traversal.notes(), "chrome", 5).unwrap();
    assert!(chrome.is_empty());
}

#[test]
fn test_browser_names_from_metadata() {
    let source = sample();
    assert_eq!(source.browser_name("safari"), Some("Safari"));
    assert_eq!(source.browser_name("edge"), None);
    assert_eq!(source.browser_ids(), vec!["chrome", "firefox", "safari"]);
}

#[test]
fn test_malformed_support_stops_the_stream() {
    let source = BcdSource::from_value(json!({
        "api": {
            "A": { "__compat": { "support": { "chrome": { "version_added": "1" } } } },
            "B": { "__compat": { "support": { "chrome": "yes" } } },
            "C": { "__compat": { "support": { "chrome": { "version_added": "3" } } } }
        }
    }))
    .unwrap();
    let traversal = Traversal::new(&source, TraversalConfig::with_browsers(["chrome"]));

    let results: Vec<_> = traversal.statements().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(CompatError::Source(_))));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = BcdSource::from_path("/nonexistent/data.json").unwrap_err();
    assert!(matches!(err, compatscan::SourceError::Io(_)));
}

//! JSON output for records and reports
//!
//! Statement and note streams are written as JSON Lines, one record per
//! line, as they are pulled. Reports are one pretty-printed document.

use crate::denylist::DenylistHit;
use crate::near_duplicates::NearDuplicateGroup;
use crate::stats::{BrowserStats, NoteFrequency, StatsTracker};
use serde::Serialize;
use std::io::Write;

/// Per-browser statistics entry
#[derive(Debug, Clone, Serialize)]
pub struct JsonBrowserStats {
    pub browser: String,
    /// Display name from the source's browser metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub stats: BrowserStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_notes: Vec<NoteFrequency>,
}

/// Aggregate statistics section
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    pub features: usize,
    pub browsers: Vec<JsonBrowserStats>,
    pub total: BrowserStats,
}

/// Near-duplicate clustering section
#[derive(Debug, Clone, Serialize)]
pub struct JsonNearDuplicates {
    pub browser: String,
    pub threshold: usize,
    pub groups: Vec<NearDuplicateGroup>,
}

/// Denylist scan section
#[derive(Debug, Clone, Serialize)]
pub struct JsonDenylist {
    pub terms: usize,
    pub hits: Vec<DenylistHit>,
}

/// Root JSON report structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<JsonStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_duplicates: Option<JsonNearDuplicates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denylist: Option<JsonDenylist>,
}

impl JsonReport {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "compatscan-json-v1".to_string(),
            stats: None,
            near_duplicates: None,
            denylist: None,
        }
    }

    /// Set statistics, with up to `top` frequent notes per browser
    pub fn set_stats<F>(&mut self, tracker: &StatsTracker, top: usize, browser_name: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let browsers = tracker
            .per_browser()
            .into_iter()
            .map(|(browser, stats)| JsonBrowserStats {
                browser: browser.to_string(),
                name: browser_name(browser),
                stats: stats.clone(),
                top_notes: tracker.top_notes(browser, top),
            })
            .collect();

        self.stats = Some(JsonStats {
            features: tracker.feature_count(),
            browsers,
            total: tracker.totals(),
        });
    }

    pub fn set_near_duplicates(
        &mut self,
        browser: &str,
        threshold: usize,
        groups: Vec<NearDuplicateGroup>,
    ) {
        self.near_duplicates = Some(JsonNearDuplicates {
            browser: browser.to_string(),
            threshold,
            groups,
        });
    }

    pub fn set_denylist(&mut self, terms: usize, hits: Vec<DenylistHit>) {
        self.denylist = Some(JsonDenylist { terms, hits });
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one record as a JSON Lines entry
pub fn write_json_line<W: Write, T: Serialize>(writer: &mut W, record: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::near_duplicates::NearDuplicate;
    use crate::record::{Statement, StatementFields};
    use crate::source::VersionValue;

    fn statement(browser: &str) -> Statement {
        Statement {
            fields: StatementFields {
                statement_id: format!("api.Foo.{}.0", browser),
                compat_key: "api.Foo".to_string(),
                description: None,
                mdn_url: None,
                browser: browser.to_string(),
                name_variant: None,
                flagged: true,
                version_added: Some(VersionValue::Bool(true)),
                version_removed: VersionValue::Bool(false),
                partial_implementation: false,
            },
            notes_count: 0,
        }
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let json = JsonReport::new().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format"], "compatscan-json-v1");
        assert!(value.get("stats").is_none());
        assert!(value.get("near_duplicates").is_none());
    }

    #[test]
    fn test_stats_section() {
        let mut tracker = StatsTracker::new();
        tracker.record_statement(&statement("chrome"));
        let mut report = JsonReport::new();
        report.set_stats(&tracker, 0, |b| (b == "chrome").then(|| "Chrome".to_string()));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["stats"]["features"], 1);
        assert_eq!(value["stats"]["browsers"][0]["browser"], "chrome");
        assert_eq!(value["stats"]["browsers"][0]["name"], "Chrome");
        assert_eq!(value["stats"]["browsers"][0]["flagged"], 1);
        assert!(value["stats"]["browsers"][0].get("top_notes").is_none());
        assert_eq!(value["stats"]["total"]["statements"], 1);
    }

    #[test]
    fn test_near_duplicates_section() {
        let mut report = JsonReport::new();
        report.set_near_duplicates(
            "safari",
            5,
            vec![NearDuplicateGroup {
                anchor: "a".to_string(),
                matches: vec![NearDuplicate {
                    distance: 1,
                    text: "b".to_string(),
                }],
            }],
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["near_duplicates"]["browser"], "safari");
        assert_eq!(value["near_duplicates"]["groups"][0]["anchor"], "a");
        assert_eq!(value["near_duplicates"]["groups"][0]["matches"][0]["distance"], 1);
    }

    #[test]
    fn test_json_lines() {
        let mut out = Vec::new();
        write_json_line(&mut out, &statement("chrome")).unwrap();
        write_json_line(&mut out, &statement("safari")).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["statementId"], "api.Foo.chrome.0");
        assert_eq!(first["version_added"], true);
    }
}

//! Aggregate statistics over statement and note streams
//!
//! Counts per browser plus a total row. A tracker built with
//! [`StatsTracker::with_browsers`] reports exactly that browser order, with
//! zero rows for tracked browsers that have no statements; any other browser
//! is appended in first-seen order. Note frequencies are tracked separately
//! so the report can list the most repeated texts for a browser.

use crate::record::{Note, Statement};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Counters for a single browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrowserStats {
    pub statements: u64,
    pub flagged: u64,
    pub partial: u64,
    /// Statements shipped under a prefix or alternative name
    pub variants: u64,
    /// Statements whose version_removed is not `false`
    pub removed: u64,
    pub with_notes: u64,
    pub notes: u64,
}

impl BrowserStats {
    fn add(&mut self, other: &BrowserStats) {
        self.statements += other.statements;
        self.flagged += other.flagged;
        self.partial += other.partial;
        self.variants += other.variants;
        self.removed += other.removed;
        self.with_notes += other.with_notes;
        self.notes += other.notes;
    }
}

/// A note text and how often it appears
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteFrequency {
    pub note: String,
    pub count: u64,
}

/// Tracks statistics for all browsers
#[derive(Debug, Default)]
pub struct StatsTracker {
    order: Vec<String>,
    stats: HashMap<String, BrowserStats>,
    features: HashSet<String>,
    /// browser -> (note text -> (count, first-seen position))
    note_counts: HashMap<String, HashMap<String, (u64, usize)>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker whose rows follow the tracked browser order
    pub fn with_browsers<S: AsRef<str>>(browsers: &[S]) -> Self {
        let mut tracker = Self::default();
        for browser in browsers {
            tracker.entry(browser.as_ref());
        }
        tracker
    }

    fn entry(&mut self, browser: &str) -> &mut BrowserStats {
        if !self.stats.contains_key(browser) {
            self.order.push(browser.to_string());
        }
        self.stats.entry(browser.to_string()).or_default()
    }

    /// Record one statement
    pub fn record_statement(&mut self, statement: &Statement) {
        let fields = &statement.fields;
        self.features.insert(fields.compat_key.clone());

        let entry = self.entry(&fields.browser);
        entry.statements += 1;
        if fields.flagged {
            entry.flagged += 1;
        }
        if fields.partial_implementation {
            entry.partial += 1;
        }
        if fields.name_variant.is_some() {
            entry.variants += 1;
        }
        if !fields.version_removed.is_false() {
            entry.removed += 1;
        }
        if statement.notes_count > 0 {
            entry.with_notes += 1;
        }
        entry.notes += statement.notes_count as u64;
    }

    /// Record one note text for frequency ranking
    pub fn record_note(&mut self, note: &Note) {
        let counts = self
            .note_counts
            .entry(note.fields.browser.clone())
            .or_default();
        let next_position = counts.len();
        counts
            .entry(note.note.clone())
            .or_insert((0, next_position))
            .0 += 1;
    }

    /// Browsers in report order with their counters
    pub fn per_browser(&self) -> Vec<(&str, &BrowserStats)> {
        self.order
            .iter()
            .filter_map(|b| self.stats.get(b).map(|s| (b.as_str(), s)))
            .collect()
    }

    pub fn get(&self, browser: &str) -> Option<&BrowserStats> {
        self.stats.get(browser)
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn totals(&self) -> BrowserStats {
        let mut totals = BrowserStats::default();
        for stats in self.stats.values() {
            totals.add(stats);
        }
        totals
    }

    /// Most frequent note texts for a browser; ties keep first-seen order
    pub fn top_notes(&self, browser: &str, n: usize) -> Vec<NoteFrequency> {
        let Some(counts) = self.note_counts.get(browser) else {
            return Vec::new();
        };
        let mut ranked: Vec<_> = counts.iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(n)
            .map(|(note, (count, _))| NoteFrequency {
                note: note.clone(),
                count: *count,
            })
            .collect()
    }

    /// Render the summary table
    pub fn summary_table(&self) -> String {
        if self.totals().statements == 0 {
            return "No statements found.\n".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!("{} features\n\n", self.feature_count()));
        out.push_str("statements   flagged   partial  variants   removed with_notes     notes browser\n");
        out.push_str("---------- --------- --------- --------- --------- ---------- --------- ----------------\n");
        for (browser, stats) in self.per_browser() {
            out.push_str(&Self::format_row(stats, browser));
        }
        out.push_str("---------- --------- --------- --------- --------- ---------- --------- ----------------\n");
        out.push_str(&Self::format_row(&self.totals(), "total"));
        out
    }

    fn format_row(stats: &BrowserStats, label: &str) -> String {
        format!(
            "{:>10} {:>9} {:>9} {:>9} {:>9} {:>10} {:>9} {}\n",
            stats.statements,
            stats.flagged,
            stats.partial,
            stats.variants,
            stats.removed,
            stats.with_notes,
            stats.notes,
            label
        )
    }
}

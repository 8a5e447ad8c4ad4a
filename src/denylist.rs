//! Denylist scanning of note texts
//!
//! A denylist is a set of regular expressions. Scanning reports one hit per
//! (note, matching term) pair, in note order then term order.
//!
//! # Example TOML
//! ```toml
//! [[term]]
//! pattern = "(?i)\\bTODO\\b"
//! reason = "unfinished note"
//!
//! [[term]]
//! pattern = "see bug \\d+"
//! ```

use crate::error::Result as CompatResult;
use crate::record::Note;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A denylist entry as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenylistTerm {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DenylistTerm {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            reason: None,
        }
    }

    /// A term matching `text` literally
    pub fn literal(text: &str) -> Self {
        Self::new(regex::escape(text))
    }
}

/// A note that matched a denylist term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenylistHit {
    #[serde(rename = "statementId")]
    pub statement_id: String,
    #[serde(rename = "compatKey")]
    pub compat_key: String,
    pub browser: String,
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub note: String,
}

/// Compiled denylist
#[derive(Debug)]
pub struct Denylist {
    terms: Vec<(DenylistTerm, Regex)>,
}

impl Denylist {
    /// Compile terms; an invalid pattern is an error
    pub fn new(terms: Vec<DenylistTerm>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(terms.len());
        for term in terms {
            let regex = Regex::new(&term.pattern)
                .with_context(|| format!("Invalid denylist pattern: {}", term.pattern))?;
            compiled.push((term, regex));
        }
        Ok(Self { terms: compiled })
    }

    /// Load terms from a TOML file with `[[term]]` tables
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read denylist file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load denylist: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct DenylistFile {
            #[serde(default)]
            term: Vec<DenylistTerm>,
        }

        let file: DenylistFile =
            toml::from_str(content).context("Failed to parse TOML denylist")?;
        if file.term.is_empty() {
            bail!("Denylist has no [[term]] entries");
        }
        Self::new(file.term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &DenylistTerm> {
        self.terms.iter().map(|(term, _)| term)
    }

    /// Terms matching one note, in denylist order
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a DenylistTerm> + 'a {
        self.terms
            .iter()
            .filter(move |(_, regex)| regex.is_match(text))
            .map(|(term, _)| term)
    }

    /// Hits for one note
    pub fn scan(&self, note: &Note) -> Vec<DenylistHit> {
        self.matches(&note.note)
            .map(|term| DenylistHit {
                statement_id: note.fields.statement_id.clone(),
                compat_key: note.fields.compat_key.clone(),
                browser: note.fields.browser.clone(),
                term: term.pattern.clone(),
                reason: term.reason.clone(),
                note: note.note.clone(),
            })
            .collect()
    }

    /// Scan a fallible note stream; the first error aborts the scan
    pub fn scan_notes<I>(&self, notes: I) -> CompatResult<Vec<DenylistHit>>
    where
        I: IntoIterator<Item = CompatResult<Note>>,
    {
        let mut hits = Vec::new();
        for note in notes {
            hits.extend(self.scan(&note?));
        }
        Ok(hits)
    }
}

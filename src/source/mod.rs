//! Support-data source boundary
//!
//! The traversal engine never reads compat data directly. It asks a
//! [`SupportSource`] for the feature tree and, per (feature, browser) pair,
//! for the raw support statements. A browser with no entry for a feature is
//! reported as [`SupportLookup::NoDataForBrowser`], not as an error.

mod bcd;

pub use bcd::{BcdSource, FeatureTree};

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A node of the compat tree that carries compat data
#[derive(Debug, Clone)]
pub struct Feature<'a> {
    /// Dot-delimited path from the root (e.g. "api.Foo.bar")
    pub id: String,
    pub description: Option<&'a str>,
    pub mdn_url: Option<&'a str>,
    /// Per-browser support entries, `None` when the node has no `support` object
    pub support: Option<&'a Map<String, Value>>,
}

/// Outcome of querying one feature for one browser
#[derive(Debug, Clone, PartialEq)]
pub enum SupportLookup {
    Found(Vec<RawStatement>),
    NoDataForBrowser,
}

/// Where support statements come from
pub trait SupportSource {
    /// Features in the source's native, deterministic order
    fn features(&self) -> Box<dyn Iterator<Item = Result<Feature<'_>, SourceError>> + '_>;

    /// Raw statements for one feature on one browser
    fn support_statements(
        &self,
        feature: &Feature<'_>,
        browser: &str,
    ) -> Result<SupportLookup, SourceError>;

    /// Display name for a browser id, if the source knows the browser
    fn browser_name(&self, browser: &str) -> Option<&str>;
}

/// A version field: either a version string ("10", "≤37", "preview") or a
/// boolean marker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Bool(bool),
    Text(String),
}

impl VersionValue {
    pub fn is_false(&self) -> bool {
        matches!(self, VersionValue::Bool(false))
    }
}

impl Default for VersionValue {
    fn default() -> Self {
        VersionValue::Bool(false)
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionValue::Bool(b) => write!(f, "{}", b),
            VersionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Raw `notes` field: one string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNotes {
    One(String),
    Many(Vec<String>),
}

/// A browser flag that must be set to enable a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_to_set: Option<String>,
}

/// One support statement exactly as the source describes it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawStatement {
    /// Filled in by the source, not read from the statement body
    #[serde(skip)]
    pub browser: String,
    /// Back-reference to the owning feature's id
    #[serde(skip)]
    pub feature_id: Option<String>,
    pub version_added: Option<VersionValue>,
    pub version_removed: Option<VersionValue>,
    pub flags: Vec<Flag>,
    pub partial_implementation: bool,
    pub notes: Option<RawNotes>,
    pub prefix: Option<String>,
    pub alternative_name: Option<String>,
}

impl RawStatement {
    /// Notes normalized to a list: absent is empty, a single string is a
    /// one-element list
    pub fn note_texts(&self) -> Vec<&str> {
        match &self.notes {
            None => Vec::new(),
            Some(RawNotes::One(note)) => vec![note.as_str()],
            Some(RawNotes::Many(notes)) => notes.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }
}

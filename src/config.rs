// Run configuration loaded from `compatscan.toml`
//
// Every key is optional. Missing keys fall back to the core browser list,
// no excluded prefixes, the default near-duplicate threshold and an empty
// denylist.

use crate::denylist::DenylistTerm;
use crate::near_duplicates::DEFAULT_THRESHOLD;
use crate::traversal::{TraversalConfig, CORE_BROWSERS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Configuration for one compatscan run
///
/// # Example
/// ```
/// use compatscan::config::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.near_duplicate_threshold, 5);
/// assert!(config.excluded_prefixes.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Tracked browsers, in enumeration order. Order determines statement ids.
    pub browsers: Vec<String>,

    /// Compat key prefixes to skip (e.g. "webextensions")
    pub excluded_prefixes: BTreeSet<String>,

    /// Notes closer than this edit distance are near-duplicates
    pub near_duplicate_threshold: usize,

    /// Patterns the denylist scan reports
    pub denylist: Vec<DenylistTerm>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            browsers: CORE_BROWSERS.iter().map(|s| s.to_string()).collect(),
            excluded_prefixes: BTreeSet::new(),
            near_duplicate_threshold: DEFAULT_THRESHOLD,
            denylist: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML, has
    /// unknown keys, or lists no browsers.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScanConfig =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations a traversal cannot use
    pub fn validate(&self) -> Result<()> {
        if self.browsers.is_empty() {
            bail!("At least one browser must be tracked");
        }
        let mut seen = BTreeSet::new();
        for browser in &self.browsers {
            if !seen.insert(browser.as_str()) {
                bail!("Browser '{}' is listed more than once", browser);
            }
        }
        Ok(())
    }

    /// Replace the browser list when any are given
    pub fn with_browsers(mut self, browsers: &[String]) -> Self {
        if !browsers.is_empty() {
            self.browsers = browsers.to_vec();
        }
        self
    }

    /// Add excluded prefixes to the configured set
    pub fn with_excluded_prefixes(mut self, prefixes: &[String]) -> Self {
        self.excluded_prefixes.extend(prefixes.iter().cloned());
        self
    }

    pub fn with_threshold(mut self, threshold: Option<usize>) -> Self {
        if let Some(threshold) = threshold {
            self.near_duplicate_threshold = threshold;
        }
        self
    }

    pub fn traversal(&self) -> TraversalConfig {
        TraversalConfig {
            browsers: self.browsers.clone(),
            excluded_prefixes: self.excluded_prefixes.clone(),
        }
    }
}

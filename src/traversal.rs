//! Traversal engine: flattens the compat tree into statement records
//!
//! The walk visits features in source order, and for each feature the
//! tracked browsers in configured order, and for each browser the source's
//! statements in order. `index` counts statements within one feature across
//! all browsers, so `api.Foo.safari.1` means "second statement of api.Foo".
//!
//! Everything is pull-based: the source is queried for a (feature, browser)
//! pair only when the consumer has drained the previous pair.

use crate::error::{CompatError, Result, SourceError};
use crate::record::{Note, Statement};
use crate::source::{Feature, RawStatement, SupportLookup, SupportSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Browsers tracked when no list is configured
pub const CORE_BROWSERS: &[&str] = &[
    "chrome",
    "chrome_android",
    "edge",
    "firefox",
    "firefox_android",
    "safari",
    "safari_ios",
];

/// Which browsers to enumerate and which features to skip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Tracked browser ids, enumerated in this order
    pub browsers: Vec<String>,
    /// Features whose compat key starts with any of these are skipped
    pub excluded_prefixes: BTreeSet<String>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            browsers: CORE_BROWSERS.iter().map(|s| s.to_string()).collect(),
            excluded_prefixes: BTreeSet::new(),
        }
    }
}

impl TraversalConfig {
    pub fn with_browsers<I, S>(browsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            browsers: browsers.into_iter().map(Into::into).collect(),
            excluded_prefixes: BTreeSet::new(),
        }
    }

    pub fn exclude_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.excluded_prefixes.insert(prefix.into());
        self
    }

    pub fn is_excluded(&self, compat_key: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| compat_key.starts_with(prefix.as_str()))
    }
}

/// One raw statement positioned in the walk
#[derive(Debug, Clone, PartialEq)]
pub struct WalkRecord {
    pub compat_key: String,
    pub mdn_url: Option<String>,
    pub description: Option<String>,
    /// Position among all of this feature's statements, across browsers
    pub index: usize,
    pub statement: RawStatement,
}

/// Flattening engine bound to one source and one configuration
pub struct Traversal<'s, S: SupportSource + ?Sized> {
    source: &'s S,
    config: TraversalConfig,
}

impl<'s, S: SupportSource + ?Sized> Traversal<'s, S> {
    pub fn new(source: &'s S, config: TraversalConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Lazy walk over every raw statement; re-walks the source on each call
    pub fn walk(&self) -> Walk<'_, S> {
        Walk {
            source: self.source,
            config: &self.config,
            features: self.source.features(),
            current: None,
            done: false,
        }
    }

    /// Normalized statements, one per walk record
    pub fn statements(&self) -> impl Iterator<Item = Result<Statement>> + '_ {
        StopOnError::new(
            self.walk()
                .map(|record| record.and_then(|record| Statement::from_walk(&record))),
        )
    }

    /// Normalized notes, one per (statement, note text) pair
    pub fn notes(&self) -> impl Iterator<Item = Result<Note>> + '_ {
        StopOnError::new(self.walk().flat_map(|record| {
            match record.and_then(|record| Note::from_walk(&record)) {
                Ok(notes) => notes.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            }
        }))
    }
}

/// Ends a result stream after its first error
struct StopOnError<I> {
    inner: I,
    failed: bool,
}

impl<I> StopOnError<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

impl<T, I: Iterator<Item = Result<T>>> Iterator for StopOnError<I> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        self.failed = item.is_err();
        Some(item)
    }
}

/// Statements of the feature currently being walked
struct FeatureCursor<'a> {
    feature: Feature<'a>,
    next_browser: usize,
    pending: std::vec::IntoIter<RawStatement>,
    index: usize,
}

/// Iterator behind [`Traversal::walk`]
///
/// Fused after the first fatal error.
pub struct Walk<'a, S: SupportSource + ?Sized> {
    source: &'a S,
    config: &'a TraversalConfig,
    features: Box<dyn Iterator<Item = std::result::Result<Feature<'a>, SourceError>> + 'a>,
    current: Option<FeatureCursor<'a>>,
    done: bool,
}

impl<'a, S: SupportSource + ?Sized> Walk<'a, S> {
    fn fail(&mut self, err: CompatError) -> Option<Result<WalkRecord>> {
        self.done = true;
        self.current = None;
        Some(Err(err))
    }
}

impl<'a, S: SupportSource + ?Sized> Iterator for Walk<'a, S> {
    type Item = Result<WalkRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Some(cursor) = self.current.as_mut() {
                if let Some(statement) = cursor.pending.next() {
                    let record = WalkRecord {
                        compat_key: cursor.feature.id.clone(),
                        mdn_url: cursor.feature.mdn_url.map(str::to_string),
                        description: cursor.feature.description.map(str::to_string),
                        index: cursor.index,
                        statement,
                    };
                    cursor.index += 1;
                    trace!(compat_key = %record.compat_key, index = record.index, "statement");
                    return Some(Ok(record));
                }

                if let Some(browser) = self.config.browsers.get(cursor.next_browser) {
                    cursor.next_browser += 1;
                    match self.source.support_statements(&cursor.feature, browser) {
                        Ok(SupportLookup::Found(statements)) => {
                            cursor.pending = statements.into_iter();
                        }
                        Ok(SupportLookup::NoDataForBrowser) => {
                            trace!(
                                compat_key = %cursor.feature.id,
                                browser = %browser,
                                "no support data"
                            );
                        }
                        Err(e) => return self.fail(e.into()),
                    }
                    continue;
                }

                self.current = None;
            }

            match self.features.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => return self.fail(e.into()),
                Some(Ok(feature)) => {
                    if self.config.is_excluded(&feature.id) {
                        debug!(compat_key = %feature.id, "skipping excluded feature");
                        continue;
                    }
                    self.current = Some(FeatureCursor {
                        feature,
                        next_browser: 0,
                        pending: Vec::new().into_iter(),
                        index: 0,
                    });
                }
            }
        }
    }
}

//! JSON-backed source in the browser-compat-data layout
//!
//! ```json
//! {
//!   "browsers": { "chrome": { "name": "Chrome" } },
//!   "api": {
//!     "Foo": {
//!       "__compat": {
//!         "mdn_url": "https://developer.mozilla.org/docs/Web/API/Foo",
//!         "support": {
//!           "chrome": { "version_added": "10" },
//!           "safari": [{ "version_added": "9", "notes": "Partial support." }]
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Key order of the document is the traversal order, so the JSON map must
//! preserve insertion order (`serde_json/preserve_order`).

use super::{Feature, RawStatement, SupportLookup, SupportSource};
use crate::error::SourceError;
use serde::Deserialize;
use serde_json::{map, Map, Value};
use std::fs;
use std::path::Path;

const BROWSERS_KEY: &str = "browsers";
const COMPAT_KEY: &str = "__compat";

/// In-memory compat dataset
#[derive(Debug, Clone)]
pub struct BcdSource {
    root: Map<String, Value>,
}

impl BcdSource {
    /// Wrap an already parsed document; the root must be a JSON object
    pub fn from_value(root: Value) -> Result<Self, SourceError> {
        match root {
            Value::Object(root) => Ok(Self { root }),
            other => Err(SourceError::MalformedNode {
                path: String::new(),
                reason: format!("expected an object at the root, found {}", kind(&other)),
            }),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, SourceError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Browser ids listed in the document's browser metadata
    pub fn browser_ids(&self) -> Vec<&str> {
        self.root
            .get(BROWSERS_KEY)
            .and_then(Value::as_object)
            .map(|browsers| browsers.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl SupportSource for BcdSource {
    fn features(&self) -> Box<dyn Iterator<Item = Result<Feature<'_>, SourceError>> + '_> {
        Box::new(FeatureTree::new(&self.root))
    }

    fn support_statements(
        &self,
        feature: &Feature<'_>,
        browser: &str,
    ) -> Result<SupportLookup, SourceError> {
        let Some(entry) = feature.support.and_then(|support| support.get(browser)) else {
            return Ok(SupportLookup::NoDataForBrowser);
        };

        let malformed = |reason: String| SourceError::MalformedSupport {
            feature: feature.id.clone(),
            browser: browser.to_string(),
            reason,
        };

        let entries: Vec<&Value> = match entry {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![entry],
            other => {
                return Err(malformed(format!(
                    "expected a statement or a list of statements, found {}",
                    kind(other)
                )))
            }
        };

        let mut statements = Vec::with_capacity(entries.len());
        for value in entries {
            let mut statement =
                RawStatement::deserialize(value).map_err(|e| malformed(e.to_string()))?;
            statement.browser = browser.to_string();
            statement.feature_id = Some(feature.id.clone());
            statements.push(statement);
        }

        Ok(SupportLookup::Found(statements))
    }

    fn browser_name(&self, browser: &str) -> Option<&str> {
        self.root
            .get(BROWSERS_KEY)?
            .get(browser)?
            .get("name")?
            .as_str()
    }
}

/// Pre-order walk over every node that carries `__compat`
///
/// A node is yielded before its sub-features; siblings follow document order.
pub struct FeatureTree<'a> {
    stack: Vec<(String, map::Iter<'a>)>,
}

impl<'a> FeatureTree<'a> {
    pub fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            stack: vec![(String::new(), root.iter())],
        }
    }
}

impl<'a> Iterator for FeatureTree<'a> {
    type Item = Result<Feature<'a>, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (path, children) = self.stack.last_mut()?;
            let Some((key, node)) = children.next() else {
                self.stack.pop();
                continue;
            };

            // "__compat", "__meta" and friends are data, not sub-features
            if key.starts_with("__") {
                continue;
            }
            let at_root = path.is_empty();
            if at_root && key == BROWSERS_KEY {
                continue;
            }

            let id = if at_root {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };

            let Some(children) = node.as_object() else {
                return Some(Err(SourceError::MalformedNode {
                    reason: format!("expected an object, found {}", kind(node)),
                    path: id,
                }));
            };

            self.stack.push((id.clone(), children.iter()));

            if let Some(compat) = children.get(COMPAT_KEY) {
                return Some(feature_from_compat(id, compat));
            }
        }
    }
}

fn feature_from_compat(id: String, compat: &Value) -> Result<Feature<'_>, SourceError> {
    let Some(compat) = compat.as_object() else {
        return Err(SourceError::MalformedNode {
            reason: format!("expected __compat to be an object, found {}", kind(compat)),
            path: id,
        });
    };

    let support = match compat.get("support") {
        None => None,
        Some(Value::Object(support)) => Some(support),
        Some(other) => {
            return Err(SourceError::MalformedNode {
                reason: format!("expected support to be an object, found {}", kind(other)),
                path: id,
            })
        }
    };

    Ok(Feature {
        description: compat.get("description").and_then(Value::as_str),
        mdn_url: compat.get("mdn_url").and_then(Value::as_str),
        support,
        id,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

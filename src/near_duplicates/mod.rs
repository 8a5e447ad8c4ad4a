// Near-duplicate note detection
//
// Groups the distinct note texts of one browser by pairwise Levenshtein
// distance. Every distinct text is an anchor; its matches are all other
// distinct texts strictly closer than the threshold. The relation is
// symmetric and the report keeps both directions.
//
// All-pairs on purpose: U distinct notes cost O(U² · L²). U stays in the low
// thousands for one browser, so there is no index, only a length-difference
// bound that skips pairs which cannot be under the threshold.

mod distance;

pub use distance::levenshtein;

use crate::error::Result;
use crate::record::Note;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashSet;
use tracing::debug;

/// Distance at or above which two notes are not near-duplicates
pub const DEFAULT_THRESHOLD: usize = 5;

/// One text close to an anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearDuplicate {
    pub distance: usize,
    pub text: String,
}

/// An anchor text and every other text within the threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearDuplicateGroup {
    pub anchor: String,
    pub matches: Vec<NearDuplicate>,
}

/// Distinct texts in order of first occurrence
#[derive(Debug, Default)]
pub struct UniqueTexts {
    seen: HashSet<String>,
    texts: Vec<String>,
}

impl UniqueTexts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: &str) {
        if !self.seen.contains(text) {
            self.seen.insert(text.to_string());
            self.texts.push(text.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.texts
    }
}

/// Near-duplicates among the notes of one browser
pub fn find_near_duplicates<I, N>(
    notes: I,
    browser: &str,
    threshold: usize,
) -> Vec<NearDuplicateGroup>
where
    I: IntoIterator<Item = N>,
    N: Borrow<Note>,
{
    let mut unique = UniqueTexts::new();
    for note in notes {
        let note = note.borrow();
        if note.fields.browser == browser {
            unique.insert(&note.note);
        }
    }
    debug!(browser, unique = unique.len(), "clustering notes");
    cluster_texts(&unique.into_vec(), threshold)
}

/// Like [`find_near_duplicates`], over a fallible note stream
///
/// The first error aborts the whole run.
pub fn try_find_near_duplicates<I>(
    notes: I,
    browser: &str,
    threshold: usize,
) -> Result<Vec<NearDuplicateGroup>>
where
    I: IntoIterator<Item = Result<Note>>,
{
    let mut unique = UniqueTexts::new();
    for note in notes {
        let note = note?;
        if note.fields.browser == browser {
            unique.insert(&note.note);
        }
    }
    debug!(browser, unique = unique.len(), "clustering notes");
    Ok(cluster_texts(&unique.into_vec(), threshold))
}

/// All-pairs clustering of already distinct texts
///
/// Anchors keep input order; matches keep input order within an anchor.
/// Anchors without matches are dropped.
pub fn cluster_texts(texts: &[String], threshold: usize) -> Vec<NearDuplicateGroup> {
    let lengths: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    let mut groups = Vec::new();

    for (i, anchor) in texts.iter().enumerate() {
        let mut matches = Vec::new();
        for (j, other) in texts.iter().enumerate() {
            if i == j || lengths[i].abs_diff(lengths[j]) >= threshold {
                continue;
            }
            let distance = levenshtein(anchor, other);
            if distance < threshold {
                matches.push(NearDuplicate {
                    distance,
                    text: texts[j].clone(),
                });
            }
        }
        if !matches.is_empty() {
            groups.push(NearDuplicateGroup {
                anchor: anchor.clone(),
                matches,
            });
        }
    }

    groups
}

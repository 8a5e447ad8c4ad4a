//! compatscan - browser compatibility data flattening and note analysis
//!
//! This library walks a browser-compat-data style feature tree and produces
//! two record streams: support statements and their notes. On top of those
//! streams it provides aggregate statistics, near-duplicate note clustering
//! by edit distance, and denylist scanning.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod denylist;
pub mod error;
pub mod json_output;
pub mod near_duplicates;
pub mod record;
pub mod source;
pub mod stats;
pub mod text_output;
pub mod traversal;

pub use error::{CompatError, SourceError};
pub use record::{Note, Statement, StatementFields};
pub use traversal::{Traversal, TraversalConfig};

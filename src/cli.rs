//! CLI argument parsing for compatscan

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for records and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON Lines for records, a JSON document for reports
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
    /// Tab-separated values
    Tsv,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every support statement
    Statements,

    /// List every note, one row per note text
    Notes,

    /// Show per-browser statistics
    Stats {
        /// Also list the N most frequent notes per browser
        #[arg(long = "top", value_name = "N", default_value = "0")]
        top: usize,
    },

    /// Find near-duplicate notes for one browser
    NearDuplicates {
        /// Browser whose notes are compared
        #[arg(short = 't', long = "target", value_name = "BROWSER")]
        target: String,

        /// Report pairs with edit distance strictly below this (default: 5)
        #[arg(long = "threshold", value_name = "N")]
        threshold: Option<usize>,
    },

    /// Scan notes for denylisted terms
    Denylist {
        /// TOML file with [[term]] entries
        #[arg(long = "denylist", value_name = "PATH")]
        denylist: Option<PathBuf>,

        /// Regular expression to flag (repeatable)
        #[arg(long = "term", value_name = "REGEX")]
        terms: Vec<String>,

        /// Literal text to flag (repeatable)
        #[arg(long = "literal", value_name = "TEXT")]
        literals: Vec<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "compatscan")]
#[command(version)]
#[command(about = "Flatten browser compat data into statements and notes, and analyze the notes", long_about = None)]
pub struct Cli {
    /// Compat data JSON file
    #[arg(short = 'd', long = "data", value_name = "PATH")]
    pub data: PathBuf,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Track this browser (repeatable, replaces the configured list)
    #[arg(short = 'b', long = "browser", value_name = "ID", global = true)]
    pub browsers: Vec<String>,

    /// Skip features whose key starts with PREFIX (repeatable)
    #[arg(long = "exclude-prefix", value_name = "PREFIX", global = true)]
    pub exclude_prefixes: Vec<String>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Render compat keys as spreadsheet hyperlinks (csv/tsv only)
    #[arg(long = "hyperlinks", global = true)]
    pub hyperlinks: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

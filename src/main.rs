use anyhow::{bail, Context, Result};
use clap::Parser;
use compatscan::cli::{Cli, Command, OutputFormat};
use compatscan::config::ScanConfig;
use compatscan::csv_output::{CsvOutput, Delimiter};
use compatscan::denylist::{Denylist, DenylistTerm};
use compatscan::json_output::{write_json_line, JsonReport};
use compatscan::near_duplicates::try_find_near_duplicates;
use compatscan::source::{BcdSource, SupportSource};
use compatscan::stats::StatsTracker;
use compatscan::text_output;
use compatscan::traversal::Traversal;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

fn delimiter(format: OutputFormat) -> Delimiter {
    match format {
        OutputFormat::Tsv => Delimiter::Tab,
        _ => Delimiter::Comma,
    }
}

/// Warn about tracked browsers the data does not describe
fn warn_unknown_browsers(source: &BcdSource, browsers: &[String]) {
    for browser in browsers {
        if source.browser_name(browser).is_none() {
            warn!(browser = %browser, "tracked browser not found in browser metadata");
        }
    }
}

fn run_statements<W: Write>(
    traversal: &Traversal<'_, BcdSource>,
    format: OutputFormat,
    hyperlinks: bool,
    out: &mut W,
) -> Result<()> {
    let mut count = 0usize;
    match format {
        OutputFormat::Text => {
            for statement in traversal.statements() {
                writeln!(out, "{}", text_output::format_statement(&statement?))?;
                count += 1;
            }
        }
        OutputFormat::Json => {
            for statement in traversal.statements() {
                write_json_line(out, &statement?)?;
                count += 1;
            }
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut csv = CsvOutput::new(out, delimiter(format), hyperlinks);
            csv.write_statement_header()?;
            for statement in traversal.statements() {
                csv.write_statement(&statement?)?;
                count += 1;
            }
        }
    }
    info!(statements = count, "wrote statements");
    Ok(())
}

fn run_notes<W: Write>(
    traversal: &Traversal<'_, BcdSource>,
    format: OutputFormat,
    hyperlinks: bool,
    out: &mut W,
) -> Result<()> {
    let mut count = 0usize;
    match format {
        OutputFormat::Text => {
            for note in traversal.notes() {
                writeln!(out, "{}", text_output::format_note(&note?))?;
                count += 1;
            }
        }
        OutputFormat::Json => {
            for note in traversal.notes() {
                write_json_line(out, &note?)?;
                count += 1;
            }
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut csv = CsvOutput::new(out, delimiter(format), hyperlinks);
            csv.write_note_header()?;
            for note in traversal.notes() {
                csv.write_note(&note?)?;
                count += 1;
            }
        }
    }
    info!(notes = count, "wrote notes");
    Ok(())
}

fn run_stats<W: Write>(
    source: &BcdSource,
    traversal: &Traversal<'_, BcdSource>,
    format: OutputFormat,
    top: usize,
    out: &mut W,
) -> Result<()> {
    let mut tracker = StatsTracker::with_browsers(&traversal.config().browsers);
    for statement in traversal.statements() {
        tracker.record_statement(&statement?);
    }
    if top > 0 {
        for note in traversal.notes() {
            tracker.record_note(&note?);
        }
    }

    match format {
        OutputFormat::Text => {
            write!(out, "{}", tracker.summary_table())?;
            if top > 0 {
                for (browser, _) in tracker.per_browser() {
                    let frequent = tracker.top_notes(browser, top);
                    if frequent.is_empty() {
                        continue;
                    }
                    writeln!(out, "\nMost frequent {} notes:", browser)?;
                    for entry in frequent {
                        writeln!(out, "{:>6}  {}", entry.count, entry.note)?;
                    }
                }
            }
        }
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            report.set_stats(&tracker, top, |b| source.browser_name(b).map(str::to_string));
            writeln!(out, "{}", report.to_json()?)?;
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            CsvOutput::new(out, delimiter(format), false).write_stats(&tracker)?;
        }
    }
    Ok(())
}

fn run_near_duplicates<W: Write>(
    traversal: &Traversal<'_, BcdSource>,
    format: OutputFormat,
    target: &str,
    threshold: usize,
    out: &mut W,
) -> Result<()> {
    if !traversal.config().browsers.iter().any(|b| b == target) {
        bail!(
            "Browser '{}' is not tracked; add it with --browser {}",
            target,
            target
        );
    }

    let groups = try_find_near_duplicates(traversal.notes(), target, threshold)?;
    info!(browser = target, groups = groups.len(), "near-duplicate search done");

    match format {
        OutputFormat::Text => write!(out, "{}", text_output::format_near_duplicates(&groups))?,
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            report.set_near_duplicates(target, threshold, groups);
            writeln!(out, "{}", report.to_json()?)?;
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            CsvOutput::new(out, delimiter(format), false).write_near_duplicates(&groups)?;
        }
    }
    Ok(())
}

fn build_denylist(
    config: &ScanConfig,
    file: Option<&PathBuf>,
    terms: &[String],
    literals: &[String],
) -> Result<Denylist> {
    let mut all_terms = config.denylist.clone();
    if let Some(path) = file {
        let from_file = Denylist::from_toml(path)?;
        all_terms.extend(from_file.terms().cloned());
    }
    all_terms.extend(terms.iter().map(DenylistTerm::new));
    all_terms.extend(literals.iter().map(|text| DenylistTerm::literal(text)));

    if all_terms.is_empty() {
        bail!("No denylist terms configured. Use --term, --literal, --denylist or [[denylist]] in the config file");
    }
    Denylist::new(all_terms)
}

fn run_denylist<W: Write>(
    traversal: &Traversal<'_, BcdSource>,
    format: OutputFormat,
    denylist: &Denylist,
    out: &mut W,
) -> Result<()> {
    let hits = denylist.scan_notes(traversal.notes())?;
    info!(terms = denylist.len(), hits = hits.len(), "denylist scan done");

    match format {
        OutputFormat::Text => write!(out, "{}", text_output::format_denylist_hits(&hits))?,
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            report.set_denylist(denylist.len(), hits);
            writeln!(out, "{}", report.to_json()?)?;
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            CsvOutput::new(out, delimiter(format), false).write_denylist_hits(&hits)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let threshold_override = match &args.command {
        Command::NearDuplicates { threshold, .. } => *threshold,
        _ => None,
    };

    let config = match &args.config {
        Some(path) => ScanConfig::from_toml(path)?,
        None => ScanConfig::default(),
    }
    .with_browsers(&args.browsers)
    .with_excluded_prefixes(&args.exclude_prefixes)
    .with_threshold(threshold_override);
    config.validate()?;

    // Denylist patterns are compiled before the data is loaded
    let denylist = match &args.command {
        Command::Denylist {
            denylist,
            terms,
            literals,
        } => Some(build_denylist(&config, denylist.as_ref(), terms, literals)?),
        _ => None,
    };

    let source = BcdSource::from_path(&args.data)
        .with_context(|| format!("Failed to load compat data: {}", args.data.display()))?;
    warn_unknown_browsers(&source, &config.browsers);

    let traversal = Traversal::new(&source, config.traversal());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(denylist) = &denylist {
        run_denylist(&traversal, args.format, denylist, &mut out)?;
    } else {
        match &args.command {
            Command::Statements => {
                run_statements(&traversal, args.format, args.hyperlinks, &mut out)?
            }
            Command::Notes => run_notes(&traversal, args.format, args.hyperlinks, &mut out)?,
            Command::Stats { top } => {
                run_stats(&source, &traversal, args.format, *top, &mut out)?
            }
            Command::NearDuplicates { target, .. } => run_near_duplicates(
                &traversal,
                args.format,
                target,
                config.near_duplicate_threshold,
                &mut out,
            )?,
            Command::Denylist { .. } => {}
        }
    }

    out.flush()?;
    Ok(())
}

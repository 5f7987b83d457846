//! Annotation of sequence variants.

pub mod ann;
pub mod csq;
pub mod hgvs;
pub mod variant;

use std::io::{BufRead, Write};
use std::time::Instant;

use clap::Parser;

use self::variant::Variant;
use crate::annotate::cli::{OutputStyle, ScopeArgs};
use crate::browser::views::{restrict_annotations, variant_list_row, AnnotationScope};
use crate::common::{open_read_maybe_gz, open_write_maybe_gz};

/// Command line arguments for `annotate seqvars` sub command.
#[derive(Parser, Debug)]
#[command(about = "Decorate VEP-annotated variant records", long_about = None)]
pub struct Args {
    /// Path to the input JSONL file with one variant per line.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output JSONL file.
    #[arg(long)]
    pub path_output: String,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Shape of the written records.
    #[arg(long, value_enum, default_value_t = OutputStyle::Full)]
    pub output_style: OutputStyle,

    /// For debug purposes, maximal number of variants to annotate.
    #[arg(long)]
    pub max_var_count: Option<usize>,
}

/// Counters of one annotation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub written: usize,
    pub skipped: usize,
}

/// Decorate one variant record and render it in the given style.
fn process_record(
    value: serde_json::Value,
    scope: &AnnotationScope,
    output_style: OutputStyle,
) -> Result<String, anyhow::Error> {
    let mut variant: Variant = serde_json::from_value(value)?;

    restrict_annotations(&mut variant, scope);
    variant.decorate();

    Ok(match output_style {
        OutputStyle::Full => serde_json::to_string(&variant)?,
        OutputStyle::List => serde_json::to_string(&variant_list_row(&variant)?)?,
    })
}

/// Decorate all records from `reader` and write them to `writer`.
///
/// Records that cannot be parsed, e.g., because of an unknown consequence term, are
/// logged and skipped.
pub fn run_with_writer<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    args: &Args,
) -> Result<Stats, anyhow::Error> {
    let scope = AnnotationScope::from(&args.scope);
    let mut stats = Stats::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut variant_id = String::new();
        let result = serde_json::from_str::<serde_json::Value>(&line)
            .map_err(anyhow::Error::from)
            .and_then(|value| {
                if let Some(id) = value.get("variant_id").and_then(|id| id.as_str()) {
                    variant_id = id.to_string();
                }
                process_record(value, &scope, args.output_style)
            });
        match result {
            Ok(record) => {
                writeln!(writer, "{}", record)?;
                stats.written += 1;
            }
            Err(e) => {
                tracing::error!(
                    "skipping record on line {} ({}): {}",
                    lineno + 1,
                    variant_id,
                    e
                );
                stats.skipped += 1;
            }
        }

        if let Some(max_var_count) = args.max_var_count {
            if stats.written >= max_var_count {
                tracing::warn!(
                    "Stopping after {} records as requested by --max-var-count",
                    stats.written
                );
                break;
            }
        }
    }
    writer.flush()?;

    Ok(stats)
}

/// Main entry point for `annotate seqvars` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("config = {:#?}", &common);
    tracing::info!("args = {:#?}", &args);

    tracing::info!("Annotating variants ...");
    let start = Instant::now();

    let reader = open_read_maybe_gz(&args.path_input)?;
    let mut writer = open_write_maybe_gz(&args.path_output)?;
    let stats = run_with_writer(reader, &mut writer, args)?;

    tracing::info!(
        "... wrote {} records and skipped {} in {:?}",
        stats.written,
        stats.skipped,
        start.elapsed()
    );
    Ok(())
}

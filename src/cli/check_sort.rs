use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cli::OutputFormat;
use crate::parsing::load_contig_order;
use crate::stream::{CoordinateGrouper, SortedRecordReader};

#[derive(Args)]
pub struct CheckSortArgs {
    /// Variant file to check (plain or gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// FASTA (with .fai alongside), .fai, .dict, or VCF defining the contig order
    #[arg(long)]
    pub genome_reference: PathBuf,
}

/// Result of a successful sort check
#[derive(Debug, Clone, Default, Serialize)]
pub struct SortCheckSummary {
    pub path: String,
    pub records: usize,
    /// Distinct coordinates
    pub coordinates: usize,
    /// Coordinates holding more than one record
    pub shared_coordinates: usize,
    pub contigs: usize,
    pub first: Option<String>,
    pub last: Option<String>,
}

/// Execute check-sort subcommand
///
/// # Errors
///
/// Returns an error naming the first out-of-order coordinate, or any read or
/// parse failure.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CheckSortArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let order = load_contig_order(&args.genome_reference)?;
    let reader = SortedRecordReader::open(&args.input, &order)?;

    if verbose {
        eprintln!(
            "Checking {} against {} contigs",
            args.input.display(),
            order.len()
        );
    }

    let mut summary = SortCheckSummary {
        path: args.input.display().to_string(),
        ..SortCheckSummary::default()
    };
    let mut last_rank = None;

    for batch in CoordinateGrouper::new(reader) {
        let batch = batch.with_context(|| format!("{} failed the sort check", args.input.display()))?;
        let key = batch.key();

        summary.records += batch.len();
        summary.coordinates += 1;
        if batch.len() > 1 {
            summary.shared_coordinates += 1;
        }
        if last_rank != Some(key.rank) {
            summary.contigs += 1;
            last_rank = Some(key.rank);
        }
        if summary.first.is_none() {
            summary.first = Some(order.describe(key));
        }
        summary.last = Some(order.describe(key));
    }

    info!(path = %summary.path, records = summary.records, "Input is sorted");

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn print_text_summary(summary: &SortCheckSummary) {
    println!("{}: sorted", summary.path);
    println!("  Records: {}", summary.records);
    println!(
        "  Coordinates: {} ({} shared by several records)",
        summary.coordinates, summary.shared_coordinates
    );
    println!("  Contigs: {}", summary.contigs);
    if let (Some(first), Some(last)) = (&summary.first, &summary.last) {
        println!("  Span: {first} .. {last}");
    }
}

fn print_tsv_summary(summary: &SortCheckSummary) {
    println!("path\trecords\tcoordinates\tshared_coordinates\tcontigs");
    println!(
        "{}\t{}\t{}\t{}\t{}",
        summary.path,
        summary.records,
        summary.coordinates,
        summary.shared_coordinates,
        summary.contigs
    );
}

//! Command-line interface for callset-diff.
//!
//! Available commands:
//!
//! - **discover**: Report probe calls that are absent from a reference call set
//! - **check-sort**: Verify that a variant file is sorted under a contig order
//!
//! ## Usage
//!
//! ```text
//! # Calls present only in the deep-sequencing set
//! callset-diff discover --probe-vcf deep.vcf.gz --reference-vcf gold.vcf.gz \
//!     --genome-reference GRCh38.fa --tool-string MSDUKT -o deep_only.vcf
//!
//! # Same, dropping calls in excluded regions
//! callset-diff discover ... --exclude-bed arms.bed --callable-bed callable.bed
//!
//! # Validate ordering before a long run
//! callset-diff check-sort calls.vcf.gz --genome-reference GRCh38.fa.fai
//! ```

use clap::{Parser, Subcommand};

pub mod check_sort;
pub mod discover;

#[derive(Parser)]
#[command(name = "callset-diff")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Find variant calls present in one sorted call set but not another")]
#[command(
    long_about = "callset-diff walks two coordinate-sorted VCF files in lock-step and reports every call of the probe set that the reference set does not contain.\n\nCalls are compared by chromosome, position, reference allele and first alternate allele. Unmatched calls are written as records with a REJECTFORNOW filter for later review."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Summary output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write probe calls missing from the reference call set
    Discover(discover::DiscoverArgs),

    /// Check that a variant file is sorted under a contig order
    CheckSort(check_sort::CheckSortArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::discovery::{
    describe_output, run_discovery, DiscoveryConfig, DiscoverySummary,
};
use crate::matching::synthesis::DEFAULT_PROVENANCE;

#[derive(Args)]
pub struct DiscoverArgs {
    /// Probe VCF: calls checked for presence in the reference VCF
    #[arg(long, visible_alias = "deeperseq-vcf")]
    pub probe_vcf: PathBuf,

    /// Reference VCF: calls checked against; its header is copied to the output
    #[arg(long, visible_alias = "goldset-vcf")]
    pub reference_vcf: PathBuf,

    /// Output VCF ('-' for stdout, '.gz' suffix to compress)
    #[arg(short, long = "outfile")]
    pub output: PathBuf,

    /// Caller combination token written into the FORMAT template (e.g. MSDUKT)
    #[arg(long)]
    pub tool_string: String,

    /// FASTA (with .fai alongside), .fai, .dict, or VCF defining the contig order
    #[arg(long)]
    pub genome_reference: PathBuf,

    /// BED of regions whose unmatched calls are dropped
    #[arg(long)]
    pub exclude_bed: Option<PathBuf>,

    /// BED of callable regions; unmatched calls outside it are flagged NonCallable
    #[arg(long)]
    pub callable_bed: Option<PathBuf>,

    /// Provenance flag written to INFO/FLAGS
    #[arg(long, default_value = DEFAULT_PROVENANCE)]
    pub provenance: String,
}

impl From<DiscoverArgs> for DiscoveryConfig {
    fn from(args: DiscoverArgs) -> Self {
        let mut config = DiscoveryConfig::new(
            args.probe_vcf,
            args.reference_vcf,
            args.output,
            args.tool_string,
            args.genome_reference,
        );
        config.exclude_regions = args.exclude_bed;
        config.callable_regions = args.callable_bed;
        config.provenance = args.provenance;
        config
    }
}

/// Execute discover subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, is unsorted or malformed, or
/// the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DiscoverArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = DiscoveryConfig::from(args);
    let to_stdout = config.output.as_os_str() == "-";

    if verbose {
        eprintln!(
            "Probe: {}\nReference: {}\nOutput: {}",
            config.probe.display(),
            config.reference.display(),
            describe_output(&config.output)
        );
    }

    let summary = run_discovery(&config).with_context(|| {
        format!(
            "Discovery of {} against {} failed",
            config.probe.display(),
            config.reference.display()
        )
    })?;

    let report = match format {
        OutputFormat::Text => format_text_summary(&summary, &config),
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
        OutputFormat::Tsv => format_tsv_summary(&summary),
    };

    // Keep stdout clean when the records themselves go there
    if to_stdout {
        eprintln!("{report}");
    } else {
        println!("{report}");
    }

    Ok(())
}

fn format_text_summary(summary: &DiscoverySummary, config: &DiscoveryConfig) -> String {
    let mut text = String::new();
    text.push_str("Discovery Results\n");
    text.push_str(&"=".repeat(60));
    text.push('\n');
    text.push_str(&format!("\nProbe: {}\n", summary.probe));
    text.push_str(&format!("Reference: {}\n", summary.reference));
    text.push_str(&format!("Output: {}\n", describe_output(&config.output)));
    text.push_str(&format!(
        "\n  Probe records: {}\n",
        summary.join.probe_records
    ));
    text.push_str(&format!(
        "  Probe coordinates: {}\n",
        summary.join.probe_batches
    ));
    text.push_str(&format!("  Matched: {}\n", summary.join.matched));
    text.push_str(&format!("  Unmatched: {}\n", summary.join.unmatched));
    text.push_str(&format!("  Excluded by region: {}\n", summary.excluded));
    text.push_str(&format!("  Flagged non-callable: {}\n", summary.non_callable));
    text.push_str(&format!("  Records written: {}", summary.emitted));
    text
}

fn format_tsv_summary(summary: &DiscoverySummary) -> String {
    format!(
        "probe_records\tmatched\tunmatched\texcluded\tnon_callable\temitted\n{}\t{}\t{}\t{}\t{}\t{}",
        summary.join.probe_records,
        summary.join.matched,
        summary.join.unmatched,
        summary.excluded,
        summary.non_callable,
        summary.emitted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::engine::JoinStats;

    fn summary() -> DiscoverySummary {
        DiscoverySummary {
            probe: "deep.vcf".to_string(),
            reference: "gold.vcf".to_string(),
            join: JoinStats {
                probe_batches: 3,
                probe_records: 4,
                matched: 1,
                unmatched: 3,
                reference_batches: 2,
            },
            excluded: 1,
            non_callable: 1,
            emitted: 2,
        }
    }

    #[test]
    fn test_tsv_summary() {
        let tsv = format_tsv_summary(&summary());
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "4\t1\t3\t1\t1\t2");
    }

    #[test]
    fn test_text_summary_to_stdout_path() {
        let config = DiscoveryConfig::new("deep.vcf", "gold.vcf", "-", "MDKT", "ref.fa");
        let text = format_text_summary(&summary(), &config);
        assert!(text.contains("Output: <stdout>"));
        assert!(text.contains("Unmatched: 3"));
    }

    #[test]
    fn test_json_summary_is_flat() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["unmatched"], 3);
        assert_eq!(json["emitted"], 2);
    }
}

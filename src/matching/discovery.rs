use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::error::{ReconcileError, Result};
use crate::core::record::VariantHeader;
use crate::core::regions::RegionFilter;
use crate::core::types::{JoinStatus, RegionStatus};
use crate::matching::engine::{JoinStats, StreamJoinEngine};
use crate::matching::synthesis::{RecordSynthesizer, DEFAULT_PROVENANCE, NON_CALLABLE_FLAG};
use crate::parsing::{bed::parse_bed_file, load_contig_order};
use crate::stream::{CoordinateGrouper, SortedRecordReader};
use crate::utils::io::create_output;

/// Everything a discovery run needs
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Stream whose calls are checked for presence in the reference stream
    pub probe: PathBuf,
    /// Stream checked against
    pub reference: PathBuf,
    pub output: PathBuf,
    /// Caller-combination token substituted into the FORMAT template
    pub tool_token: String,
    /// `.fai`, `.dict`, VCF, or FASTA with a `.fai` sibling
    pub reference_index: PathBuf,
    pub exclude_regions: Option<PathBuf>,
    pub callable_regions: Option<PathBuf>,
    pub provenance: String,
}

impl DiscoveryConfig {
    pub fn new(
        probe: impl Into<PathBuf>,
        reference: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        tool_token: impl Into<String>,
        reference_index: impl Into<PathBuf>,
    ) -> Self {
        Self {
            probe: probe.into(),
            reference: reference.into(),
            output: output.into(),
            tool_token: tool_token.into(),
            reference_index: reference_index.into(),
            exclude_regions: None,
            callable_regions: None,
            provenance: DEFAULT_PROVENANCE.to_string(),
        }
    }
}

/// Outcome of a discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoverySummary {
    pub probe: String,
    pub reference: String,
    #[serde(flatten)]
    pub join: JoinStats,
    /// Unmatched records dropped for falling in an exclusion region
    pub excluded: usize,
    /// Unmatched records written with the non-callable flag
    pub non_callable: usize,
    /// Lines written after the header
    pub emitted: usize,
}

/// Run discovery between the files named in `config`
///
/// # Errors
///
/// Any `ReconcileError` from loading the contig order or regions, reading
/// either stream, or writing the output. Output written before the error is
/// left in place.
pub fn run_discovery(config: &DiscoveryConfig) -> Result<DiscoverySummary> {
    let order = load_contig_order(&config.reference_index)?;

    let exclusions = config
        .exclude_regions
        .as_deref()
        .map(parse_bed_file)
        .transpose()?;
    let callable = config
        .callable_regions
        .as_deref()
        .map(parse_bed_file)
        .transpose()?;
    let filter = RegionFilter::new(exclusions, callable);

    let probe = SortedRecordReader::open(&config.probe, &order)?;
    let reference = SortedRecordReader::open(&config.reference, &order)?;

    let mut out = create_output(&config.output)?;
    let summary = discover_streams(probe, reference, &filter, config, &mut out)?;
    out.finish()
        .map_err(|e| ReconcileError::io(&config.output, e))?;

    info!(
        unmatched = summary.join.unmatched,
        emitted = summary.emitted,
        output = %config.output.display(),
        "Discovery complete"
    );
    Ok(summary)
}

/// Join two opened streams and write the header plus one synthesized line
/// per reported unmatched probe record.
///
/// # Errors
///
/// The first read, ordering, or write error.
pub fn discover_streams<R1, R2, W>(
    probe: SortedRecordReader<'_, R1>,
    reference: SortedRecordReader<'_, R2>,
    filter: &RegionFilter,
    config: &DiscoveryConfig,
    out: &mut W,
) -> Result<DiscoverySummary>
where
    R1: BufRead,
    R2: BufRead,
    W: Write + ?Sized,
{
    let output = config.output.as_path();
    let write_err = |e: std::io::Error| ReconcileError::io(output, e);

    let synthesizer = RecordSynthesizer::new(
        &config.tool_token,
        &probe.header().samples,
        reference.header().samples.len(),
    )
    .with_provenance(config.provenance.clone());

    let missing = synthesizer.missing_score_samples();
    if !missing.is_empty() {
        warn!(
            probe = %probe.source_name(),
            samples = ?missing,
            "Score sample columns absent from probe header; their scores default to 0"
        );
    }

    let mut summary = DiscoverySummary {
        probe: probe.source_name().to_string(),
        reference: reference.source_name().to_string(),
        ..DiscoverySummary::default()
    };

    write_header(reference.header(), &synthesizer.header_lines(), out).map_err(write_err)?;

    let mut engine = StreamJoinEngine::new(
        CoordinateGrouper::new(probe),
        CoordinateGrouper::new(reference),
    );

    for joined in engine.by_ref() {
        let joined = joined?;
        if joined.status == JoinStatus::Matched {
            continue;
        }

        let record = &joined.record;
        let line = match filter.classify(&record.chromosome, record.position) {
            RegionStatus::Excluded => {
                summary.excluded += 1;
                continue;
            }
            RegionStatus::NonCallable => {
                summary.non_callable += 1;
                synthesizer.synthesize(record, &[NON_CALLABLE_FLAG])
            }
            RegionStatus::Callable => synthesizer.synthesize(record, &[]),
        };
        writeln!(out, "{line}").map_err(write_err)?;
        summary.emitted += 1;
    }

    summary.join = engine.stats();
    Ok(summary)
}

/// Copy the reference metadata, then declare any output key it lacks
fn write_header<W: Write + ?Sized>(
    header: &VariantHeader,
    declarations: &[String],
    out: &mut W,
) -> std::io::Result<()> {
    for line in &header.metadata {
        writeln!(out, "{line}")?;
    }
    for line in declarations {
        if !is_declared(&header.metadata, line) {
            writeln!(out, "{line}")?;
        }
    }
    writeln!(out, "{}", header.column_line)
}

/// True if a metadata line declares the same `##KIND=<ID=...` as `declaration`
fn is_declared(metadata: &[String], declaration: &str) -> bool {
    let id = |line: &str| line.split_once(',').map(|(head, _)| head.to_string());
    let Some(wanted) = id(declaration) else {
        return false;
    };
    metadata.iter().any(|line| id(line).as_deref() == Some(wanted.as_str()))
}

/// Path used in messages when the output is stdout
#[must_use]
pub fn describe_output(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdout>".to_string()
    } else {
        path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::ContigOrder;
    use crate::core::regions::{Interval, RegionSet};
    use std::io::Cursor;

    const HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tN\tT\n";

    fn run(probe: &str, reference: &str, filter: &RegionFilter) -> Result<(String, DiscoverySummary)> {
        let order = ContigOrder::new(["chr1", "chr2", "chr3"]);
        let probe = SortedRecordReader::new(
            Cursor::new(format!("{HEADER}{probe}").into_bytes()),
            "probe.vcf",
            &order,
        )?;
        let reference = SortedRecordReader::new(
            Cursor::new(format!("##reference=gold\n{HEADER}{reference}").into_bytes()),
            "gold.vcf",
            &order,
        )?;
        let config = DiscoveryConfig::new("probe.vcf", "gold.vcf", "out.vcf", "MDKT", "ref.fa");
        let mut out = Vec::new();
        let summary = discover_streams(probe, reference, filter, &config, &mut out)?;
        Ok((String::from_utf8(out).unwrap(), summary))
    }

    fn data_lines(output: &str) -> Vec<&str> {
        output.lines().filter(|l| !l.starts_with('#')).collect()
    }

    #[test]
    fn test_matched_records_suppressed() {
        let (out, summary) = run(
            "chr1\t100\t.\tA\tT\t.\t.\t.\nchr1\t100\t.\tA\tG\t.\t.\t.\n",
            "chr1\t100\t.\tA\tT\t.\tPASS\t.\n",
            &RegionFilter::default(),
        )
        .unwrap();

        let lines = data_lines(&out);
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(&fields[..5], &["chr1", "100", ".", "A", "G"]);
        assert_eq!(fields[6], "REJECTFORNOW");
        assert!(fields[7].starts_with("nPASSES=0;FLAGS=DeeperSeqOnly"));
        assert_eq!(&fields[9..], &["./.", "./."]);
        assert_eq!(summary.join.matched, 1);
        assert_eq!(summary.emitted, 1);
    }

    #[test]
    fn test_header_copied_from_reference() {
        let (out, _) = run("", "", &RegionFilter::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(&lines[..2], &["##reference=gold", "##fileformat=VCFv4.2"]);
        assert_eq!(lines.last().copied(), HEADER.lines().last());
        assert!(lines.contains(&"##FILTER=<ID=REJECTFORNOW,Description=\"Call absent from the reference set, pending review\">"));
        assert!(lines.iter().any(|l| l.starts_with("##FORMAT=<ID=MDKT,")));
        assert_eq!(lines.iter().filter(|l| l.starts_with("##")).count(), 2 + 4 + 18);
    }

    #[test]
    fn test_existing_declarations_not_repeated() {
        let header = VariantHeader {
            metadata: vec![
                "##fileformat=VCFv4.2".to_string(),
                "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">".to_string(),
            ],
            column_line: "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO".to_string(),
            samples: Default::default(),
        };
        let declarations = RecordSynthesizer::new("MDKT", &header.samples, 0).header_lines();
        let mut out = Vec::new();
        write_header(&header, &declarations, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("##FORMAT=<ID=GT,").count(), 1);
        assert_eq!(text.matches("##INFO=<ID=FLAGS,").count(), 1);
        assert!(text.ends_with("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n"));
    }

    #[test]
    fn test_run_discovery_finishes_gzip_output() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ref.fa.fai"), "chr1\t1000\t6\t60\t61\n").unwrap();
        std::fs::write(
            dir.path().join("probe.vcf"),
            format!("{HEADER}chr1\t10\t.\tA\tT\t.\t.\t.\n"),
        )
        .unwrap();
        std::fs::write(dir.path().join("gold.vcf"), HEADER).unwrap();

        let config = DiscoveryConfig::new(
            dir.path().join("probe.vcf"),
            dir.path().join("gold.vcf"),
            dir.path().join("out.vcf.gz"),
            "MDKT",
            dir.path().join("ref.fa.fai"),
        );
        let summary = run_discovery(&config).unwrap();
        assert_eq!(summary.emitted, 1);

        // A single-member decoder fails on a missing trailer
        let bytes = std::fs::read(&config.output).unwrap();
        let mut text = String::new();
        flate2::read::GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(data_lines(&text).len(), 1);
        assert!(data_lines(&text)[0].starts_with("chr1\t10\t.\tA\tT\t"));
    }

    #[test]
    fn test_region_filter_drops_and_tags() {
        let filter = RegionFilter::new(
            Some(RegionSet::new([Interval::new("chr1", 0, 50)])),
            Some(RegionSet::new([Interval::new("chr1", 0, 150)])),
        );
        let (out, summary) = run(
            "chr1\t10\t.\tA\tT\t.\t.\t.\nchr1\t100\t.\tA\tT\t.\t.\t.\nchr1\t200\t.\tA\tT\t.\t.\t.\n",
            "",
            &filter,
        )
        .unwrap();

        let lines = data_lines(&out);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("chr1\t100\t"));
        assert!(!lines[0].contains("NonCallable"));
        assert!(lines[1].contains("FLAGS=DeeperSeqOnly,NonCallable;"));
        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.non_callable, 1);
    }

    #[test]
    fn test_unsorted_probe_writes_no_records() {
        let order = ContigOrder::new(["chr1"]);
        let probe = SortedRecordReader::new(
            Cursor::new(
                format!("{HEADER}chr1\t200\t.\tA\tT\t.\t.\t.\nchr1\t100\t.\tA\tT\t.\t.\t.\n")
                    .into_bytes(),
            ),
            "probe.vcf",
            &order,
        )
        .unwrap();
        let reference =
            SortedRecordReader::new(Cursor::new(HEADER.as_bytes().to_vec()), "gold.vcf", &order)
                .unwrap();
        let config = DiscoveryConfig::new("probe.vcf", "gold.vcf", "out.vcf", "MDKT", "ref.fa");
        let mut out = Vec::new();

        let err = discover_streams(probe, reference, &RegionFilter::default(), &config, &mut out)
            .unwrap_err();
        assert!(err.is_unsorted());
        let written = String::from_utf8(out).unwrap();
        assert!(data_lines(&written).is_empty());
    }

    #[test]
    fn test_deterministic_output() {
        let probe = "chr1\t5\t.\tC\tT\t.\t.\t.\nchr2\t50\t.\tG\tA\t.\t.\t.\nchr3\t1\t.\tT\tC,G\t.\t.\t.\n";
        let reference = "chr1\t5\t.\tC\tT\t.\t.\t.\nchr3\t1\t.\tT\tG\t.\t.\t.\n";
        let first = run(probe, reference, &RegionFilter::default()).unwrap();
        let second = run(probe, reference, &RegionFilter::default()).unwrap();
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
        assert_eq!(data_lines(&first.0).len(), 2);
    }

    #[test]
    fn test_describe_output() {
        assert_eq!(describe_output(Path::new("-")), "<stdout>");
        assert_eq!(describe_output(Path::new("out.vcf")), "out.vcf");
    }
}

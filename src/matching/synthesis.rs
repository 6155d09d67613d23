//! Output records for probe calls with no reference counterpart.
//!
//! A synthesized line keeps the site columns of the probe record and replaces
//! everything else with a fixed scaffold: a pending-review filter, an INFO
//! string with zero corroborating callers, a FORMAT template naming the
//! caller set, and a no-call genotype for every reference-side sample.

use std::fmt;

use crate::core::record::{SampleSchema, VariantRecord};

/// FILTER label: no decision has been made about the call yet
pub const PENDING_FILTER: &str = "REJECTFORNOW";

/// Default provenance flag written to `FLAGS`
pub const DEFAULT_PROVENANCE: &str = "DeeperSeqOnly";

/// Flag appended for records outside every callable region
pub const NON_CALLABLE_FLAG: &str = "NonCallable";

/// FORMAT sub-field holding a per-sample score
pub const SCORE_FIELD: &str = "SCORE";

/// Probe sample columns whose scores are carried into the output, in order
pub const SCORE_SAMPLES: [&str; 6] = [
    "BigNova.Tumor.bowtie",
    "BigNova.Tumor.bwa",
    "BigNova.Tumor.novo",
    "SPP300X.Tumor.bowtie",
    "SPP300X.Tumor.bwa",
    "SPP300X.Tumor.novo",
];

/// Genotype written for samples that have no call
pub const NO_CALL: &str = "./.";

const FORMAT_HEAD: &str = "GT:CD4:DP4:MQ0";
const FORMAT_TAIL: &str =
    "NUM_TOOLS:SCORE:VAF:altBQ:altMQ:altNM:fetCD:fetSB:refBQ:refMQ:refNM:zBQ:zMQ";

/// `(ID, Number, Type, Description)` of every fixed FORMAT key in the template
const FORMAT_DEFINITIONS: [(&str, &str, &str, &str); 17] = [
    ("GT", "1", "String", "Genotype"),
    ("CD4", "4", "Integer", "Concordant ref forward, ref reverse, alt forward, alt reverse reads"),
    ("DP4", "4", "Integer", "Ref forward, ref reverse, alt forward, alt reverse reads"),
    ("MQ0", "1", "Integer", "Reads with mapping quality 0"),
    ("NUM_TOOLS", "1", "Float", "Number of callers reporting the variant"),
    ("SCORE", "1", "Float", "Classifier score"),
    ("VAF", "1", "Float", "Variant allele frequency"),
    ("altBQ", "1", "Float", "Mean base quality of alt reads"),
    ("altMQ", "1", "Float", "Mean mapping quality of alt reads"),
    ("altNM", "1", "Float", "Mean edit distance of alt reads"),
    ("fetCD", "1", "Float", "Phred-scaled Fisher's exact test of concordance"),
    ("fetSB", "1", "Float", "Phred-scaled Fisher's exact test of strand bias"),
    ("refBQ", "1", "Float", "Mean base quality of ref reads"),
    ("refMQ", "1", "Float", "Mean mapping quality of ref reads"),
    ("refNM", "1", "Float", "Mean edit distance of ref reads"),
    ("zBQ", "1", "Float", "Z-score of the base quality rank-sum test, alt vs ref"),
    ("zMQ", "1", "Float", "Z-score of the mapping quality rank-sum test, alt vs ref"),
];

/// Read `field` of sample `sample_index` as a number, or `0.0`.
///
/// A missing sample column (`None` index, or beyond the record's samples), a
/// record without that FORMAT key, a truncated sample value, and a value that
/// is not a finite number all give `0.0`. This never fails.
#[must_use]
pub fn extract_score_or_default(
    record: &VariantRecord,
    field: &str,
    sample_index: Option<usize>,
) -> f64 {
    sample_index
        .and_then(|i| record.sample_value(field, i))
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|score| score.is_finite())
        .unwrap_or(0.0)
}

/// Score as written to INFO; magnitudes outside `[1e-4, 1e15)` use exponent form
#[must_use]
pub fn format_score(score: f64) -> String {
    let magnitude = score.abs();
    if magnitude == 0.0 || (1e-4..1e15).contains(&magnitude) {
        score.to_string()
    } else {
        format!("{score:e}")
    }
}

/// A finished output line. Built once, written once.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedRecord {
    /// CHROM..QUAL copied from the probe line
    pub site: String,
    pub filter: String,
    pub info: String,
    pub format: String,
    /// Scores of [`SCORE_SAMPLES`], in that order
    pub scores: Vec<f64>,
    /// Number of no-call sample columns
    pub sample_count: usize,
}

impl fmt::Display for SynthesizedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.site, self.filter, self.info, self.format
        )?;
        for _ in 0..self.sample_count {
            write!(f, "\t{NO_CALL}")?;
        }
        Ok(())
    }
}

/// Builds [`SynthesizedRecord`]s for unmatched probe records.
///
/// Score columns are looked up in the probe schema once, at construction.
#[derive(Debug, Clone)]
pub struct RecordSynthesizer {
    format: String,
    provenance: String,
    score_columns: Vec<Option<usize>>,
    reference_samples: usize,
}

impl RecordSynthesizer {
    /// `tool_token` names the caller combination in the FORMAT template;
    /// `reference_samples` is the number of sample columns on the reference side.
    pub fn new(tool_token: &str, probe_samples: &SampleSchema, reference_samples: usize) -> Self {
        Self {
            format: format!("{FORMAT_HEAD}:{tool_token}:{FORMAT_TAIL}"),
            provenance: DEFAULT_PROVENANCE.to_string(),
            score_columns: SCORE_SAMPLES
                .iter()
                .map(|name| probe_samples.index_of(name))
                .collect(),
            reference_samples,
        }
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    /// Score sample names missing from the probe header
    #[must_use]
    pub fn missing_score_samples(&self) -> Vec<&'static str> {
        SCORE_SAMPLES
            .iter()
            .zip(&self.score_columns)
            .filter(|(_, index)| index.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// `##FILTER`, `##INFO` and `##FORMAT` lines for every key a synthesized
    /// record uses, in that order.
    #[must_use]
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "##FILTER=<ID={PENDING_FILTER},Description=\"Call absent from the reference set, pending review\">"
            ),
            "##INFO=<ID=nPASSES,Number=1,Type=Integer,Description=\"Number of callers passing the variant\">".to_string(),
            "##INFO=<ID=FLAGS,Number=.,Type=String,Description=\"Provenance and review flags\">".to_string(),
            format!(
                "##INFO=<ID=SCORES,Number={},Type=Float,Description=\"{SCORE_FIELD} of samples {}\">",
                SCORE_SAMPLES.len(),
                SCORE_SAMPLES.join(",")
            ),
        ];

        for key in self.format.split(':') {
            let line = match FORMAT_DEFINITIONS.iter().find(|(id, ..)| *id == key) {
                Some((id, number, kind, description)) => format!(
                    "##FORMAT=<ID={id},Number={number},Type={kind},Description=\"{description}\">"
                ),
                // The caller-combination token
                None => format!(
                    "##FORMAT=<ID={key},Number=.,Type=Integer,Description=\"Calls by the {key} caller combination\">"
                ),
            };
            lines.push(line);
        }
        lines
    }

    /// Build the output record; `extra_flags` are appended to `FLAGS`
    #[must_use]
    pub fn synthesize(&self, record: &VariantRecord, extra_flags: &[&str]) -> SynthesizedRecord {
        let scores: Vec<f64> = self
            .score_columns
            .iter()
            .map(|&index| extract_score_or_default(record, SCORE_FIELD, index))
            .collect();

        let mut flags = self.provenance.clone();
        for flag in extra_flags {
            flags.push(',');
            flags.push_str(flag);
        }

        let score_list: Vec<String> = scores.iter().copied().map(format_score).collect();
        let info = format!("nPASSES=0;FLAGS={flags};SCORES={}", score_list.join(","));

        SynthesizedRecord {
            site: record.site_columns().to_string(),
            filter: PENDING_FILTER.to_string(),
            info,
            format: self.format.clone(),
            scores,
            sample_count: self.reference_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::ContigOrder;
    use crate::parsing::vcf::{parse_column_header, parse_record_line};

    const PROBE_HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tBigNova.Tumor.bowtie\tBigNova.Tumor.bwa\tBigNova.Tumor.novo\tSPP300X.Tumor.bowtie\tSPP300X.Tumor.bwa\tSPP300X.Tumor.novo";

    fn probe(line: &str) -> VariantRecord {
        parse_record_line(line, 1, "probe", &ContigOrder::new(["chr1"])).unwrap()
    }

    #[test]
    fn test_extract_or_default_policy() {
        let record = probe("chr1\t10\t.\tA\tG\t.\t.\t.\tGT:SCORE\t0/1:12.5\t0/1:abc\t0/1:.\t0/1\t0/1:inf");
        assert!((extract_score_or_default(&record, SCORE_FIELD, Some(0)) - 12.5).abs() < f64::EPSILON);
        // Non-numeric
        assert_eq!(extract_score_or_default(&record, SCORE_FIELD, Some(1)), 0.0);
        // VCF missing value
        assert_eq!(extract_score_or_default(&record, SCORE_FIELD, Some(2)), 0.0);
        // Truncated sample
        assert_eq!(extract_score_or_default(&record, SCORE_FIELD, Some(3)), 0.0);
        // Not finite
        assert_eq!(extract_score_or_default(&record, SCORE_FIELD, Some(4)), 0.0);
        // Sample column beyond the record
        assert_eq!(extract_score_or_default(&record, SCORE_FIELD, Some(9)), 0.0);
        // Sample not in the header at all
        assert_eq!(extract_score_or_default(&record, SCORE_FIELD, None), 0.0);
        // FORMAT key absent
        assert_eq!(extract_score_or_default(&record, "VAF", Some(0)), 0.0);
    }

    #[test]
    fn test_synthesize_full_line() {
        let schema = parse_column_header(PROBE_HEADER);
        let synthesizer = RecordSynthesizer::new("MSDUKT", &schema, 2);
        let record = probe(
            "chr1\t100\trs9\tA\tG,C\t33\tPASS\tDP=9\tGT:SCORE\t0/1:3\t0/1:4.5\t0/1:.\t0/1:7\t0/1\t0/1:1e1",
        );

        let out = synthesizer.synthesize(&record, &[]);
        assert_eq!(out.scores, vec![3.0, 4.5, 0.0, 7.0, 0.0, 10.0]);
        assert_eq!(
            out.to_string(),
            "chr1\t100\trs9\tA\tG,C\t33\tREJECTFORNOW\tnPASSES=0;FLAGS=DeeperSeqOnly;SCORES=3,4.5,0,7,0,10\tGT:CD4:DP4:MQ0:MSDUKT:NUM_TOOLS:SCORE:VAF:altBQ:altMQ:altNM:fetCD:fetSB:refBQ:refMQ:refNM:zBQ:zMQ\t./.\t./."
        );
    }

    #[test]
    fn test_record_without_scores_defaults_to_zero() {
        let schema = parse_column_header("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO");
        let synthesizer = RecordSynthesizer::new("MDKT", &schema, 1);
        assert_eq!(synthesizer.missing_score_samples().len(), 6);

        let out = synthesizer.synthesize(&probe("chr1\t7\t.\tT\tC\t.\t.\t."), &[]);
        assert_eq!(out.scores, vec![0.0; 6]);
        let line = out.to_string();
        assert!(line.contains("SCORES=0,0,0,0,0,0"));
        assert_eq!(line.split('\t').count(), 10);
        assert!(line.ends_with("\t./."));
    }

    #[test]
    fn test_scores_use_bounded_notation() {
        assert_eq!(format_score(0.0), "0");
        assert_eq!(format_score(2.0), "2");
        assert_eq!(format_score(-4.5), "-4.5");
        assert_eq!(format_score(0.001), "0.001");
        assert_eq!(format_score(1e300), "1e300");
        assert_eq!(format_score(1.5e-9), "1.5e-9");

        let schema = parse_column_header(PROBE_HEADER);
        let synthesizer = RecordSynthesizer::new("MDKT", &schema, 0);
        let record = probe("chr1\t5\t.\tA\tG\t.\t.\t.\tSCORE\t1e300\t1\t1\t1\t1\t1");
        let out = synthesizer.synthesize(&record, &[]);
        assert!(out.info.ends_with("SCORES=1e300,1,1,1,1,1"), "{}", out.info);
    }

    #[test]
    fn test_header_lines_declare_every_key() {
        let synthesizer = RecordSynthesizer::new("MSDUKT", &SampleSchema::default(), 1);
        let lines = synthesizer.header_lines();

        assert!(lines[0].starts_with("##FILTER=<ID=REJECTFORNOW,"));
        for id in ["nPASSES", "FLAGS", "SCORES"] {
            let prefix = format!("##INFO=<ID={id},");
            assert!(lines.iter().any(|l| l.starts_with(&prefix)), "{id}");
        }
        let format_ids: Vec<&str> = lines
            .iter()
            .filter_map(|l| l.strip_prefix("##FORMAT=<ID="))
            .filter_map(|l| l.split(',').next())
            .collect();
        assert_eq!(format_ids.join(":"), synthesizer.format);
        assert!(lines.iter().any(|l| l.starts_with("##FORMAT=<ID=MSDUKT,Number=.,Type=Integer")));
    }

    #[test]
    fn test_extra_flags_and_provenance() {
        let synthesizer =
            RecordSynthesizer::new("MDKT", &SampleSchema::default(), 0).with_provenance("ProbeOnly");
        let out = synthesizer.synthesize(&probe("chr1\t7\t.\tT\tC\t.\t.\t."), &[NON_CALLABLE_FLAG]);
        assert!(out.info.starts_with("nPASSES=0;FLAGS=ProbeOnly,NonCallable;"));
        // No trailing tab without reference samples
        assert!(out.to_string().ends_with(":zMQ"));
    }
}

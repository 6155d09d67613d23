//! Parsers for VCF-style variant text.
//!
//! Data lines carry eight fixed columns (`CHROM POS ID REF ALT QUAL FILTER
//! INFO`), then an optional FORMAT column and one column per sample. The
//! `#CHROM` header line names the samples from column 9 on.
//!
//! The `##contig=<...>` header lines can also serve as a contig order when no
//! FASTA index is at hand.

use std::path::Path;

use crate::core::contig::ContigOrder;
use crate::core::error::{ReconcileError, Result};
use crate::core::record::{SampleSchema, VariantRecord, FIRST_SAMPLE_COLUMN, FIXED_COLUMNS};

/// Build the sample schema from a `#CHROM` header line
#[must_use]
pub fn parse_column_header(line: &str) -> SampleSchema {
    SampleSchema::new(line.split('\t').skip(FIRST_SAMPLE_COLUMN))
}

/// Parse one data line into a `VariantRecord`, resolving its coordinate key.
///
/// # Errors
///
/// Returns `ReconcileError::MalformedRecord` if the line has fewer than eight
/// columns or a non-integer position, and `ReconcileError::UnknownContig` if
/// the chromosome is not in `order`.
pub fn parse_record_line(
    line: &str,
    line_number: usize,
    source_name: &str,
    order: &ContigOrder,
) -> Result<VariantRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < FIXED_COLUMNS {
        return Err(ReconcileError::MalformedRecord {
            source_name: source_name.to_string(),
            line_number,
            reason: format!(
                "expected at least {FIXED_COLUMNS} columns, found {}",
                fields.len()
            ),
        });
    }

    let position: u64 = fields[1]
        .parse()
        .map_err(|_| ReconcileError::MalformedRecord {
            source_name: source_name.to_string(),
            line_number,
            reason: format!("invalid position '{}'", fields[1]),
        })?;

    let key = order.key(fields[0], position, source_name)?;

    let format = fields
        .get(FIXED_COLUMNS)
        .map(|f| f.split(':').map(str::to_string).collect())
        .unwrap_or_default();

    let samples = fields
        .iter()
        .skip(FIRST_SAMPLE_COLUMN)
        .map(|s| (*s).to_string())
        .collect();

    Ok(VariantRecord {
        key,
        chromosome: fields[0].to_string(),
        position,
        id: fields[2].to_string(),
        reference: fields[3].to_string(),
        alternate: fields[4].to_string(),
        quality: fields[5].to_string(),
        filter: fields[6].to_string(),
        info: fields[7].to_string(),
        format,
        samples,
        line: line.to_string(),
    })
}

/// Contig order from the `##contig` lines of a VCF file header
///
/// # Errors
///
/// Returns `ReconcileError::Io` if the file cannot be read, or
/// `ReconcileError::InvalidFormat` if there are no usable contig lines.
pub fn parse_vcf_contig_file(path: &Path) -> Result<ContigOrder> {
    use std::io::BufRead;

    let reader = crate::utils::io::open_text(path)?;
    let mut header = String::new();
    for line in reader.lines() {
        let line = line.map_err(|e| ReconcileError::io(path, e))?;
        if !line.starts_with("##") {
            break;
        }
        header.push_str(&line);
        header.push('\n');
    }
    parse_vcf_contig_text(&header)
}

/// Contig order from VCF header text
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` if there are no `##contig` lines
/// or one of them is malformed.
pub fn parse_vcf_contig_text(text: &str) -> Result<ContigOrder> {
    let mut names = Vec::new();

    for line in text.lines() {
        if !line.starts_with("##contig=") {
            if line.starts_with("#CHROM") {
                break;
            }
            continue;
        }

        if let Some(name) = parse_contig_line(line)? {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(ReconcileError::InvalidFormat(
            "No ##contig lines found in VCF header".to_string(),
        ));
    }

    Ok(ContigOrder::new(names))
}

/// Contig ID of a single `##contig=<...>` line; `None` when it has no ID
fn parse_contig_line(line: &str) -> Result<Option<String>> {
    let content = line
        .strip_prefix("##contig=<")
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| ReconcileError::InvalidFormat(format!("Invalid contig line format: {line}")))?;

    Ok(split_contig_fields(content).into_iter().find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("id")
            .then(|| value.trim().trim_matches('"').to_string())
    }))
}

/// Split contig fields on commas outside double quotes.
///
/// Commas are single-byte ASCII, so `i + 1` after one is always a char
/// boundary.
fn split_contig_fields(content: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&content[start..]);

    fields
}

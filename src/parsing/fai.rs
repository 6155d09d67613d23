//! Parser for FASTA index (.fai) files using noodles.
//!
//! Only the contig names and their order matter here; the rank of a contig is
//! its line number among data lines.
//! Format: `name\tlength\toffset\tline_bases\tline_width`

use std::io::BufReader;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::contig::ContigOrder;
use crate::core::error::{ReconcileError, Result};

/// Parse a FASTA index (.fai) file using noodles.
///
/// Listings that noodles rejects (for example two-column `name\tlength`
/// files) are retried with the lenient text parser.
///
/// # Errors
///
/// Returns `ReconcileError::Io` if the file cannot be read, or
/// `ReconcileError::InvalidFormat` if no contigs are found.
pub fn parse_fai_file(path: &Path) -> Result<ContigOrder> {
    use noodles::fasta;

    let reader = std::fs::File::open(path)
        .map(BufReader::new)
        .map_err(|e| ReconcileError::io(path, e))?;

    match fasta::fai::io::Reader::new(reader).read_index() {
        Ok(index) => index_to_order(&index),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "FAI not in 5-column form, reading as plain listing");
            let text = std::fs::read_to_string(path).map_err(|e| ReconcileError::io(path, e))?;
            parse_fai_text(&text)
        }
    }
}

/// Convert noodles FAI index to a `ContigOrder`
fn index_to_order(index: &noodles::fasta::fai::Index) -> Result<ContigOrder> {
    let names: Vec<String> = index
        .as_ref()
        .iter()
        .map(|record| String::from_utf8_lossy(record.name()).to_string())
        .collect();

    if names.is_empty() {
        return Err(ReconcileError::InvalidFormat(
            "No contigs found in FAI file".to_string(),
        ));
    }

    let order = ContigOrder::new(names);
    debug!(contigs = order.len(), "Loaded contig order from FAI");
    Ok(order)
}

/// Parse FAI from text: one contig per line, name first, length second.
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` if a length is not an integer or
/// no contigs are found.
pub fn parse_fai_text(text: &str) -> Result<ContigOrder> {
    let mut names = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            return Err(ReconcileError::InvalidFormat(format!(
                "FAI line {} has fewer than 2 fields: {line}",
                i + 1
            )));
        }

        fields[1].parse::<u64>().map_err(|_| {
            ReconcileError::InvalidFormat(format!(
                "Invalid length for contig '{}': {}",
                fields[0], fields[1]
            ))
        })?;

        names.push(fields[0].to_string());
    }

    if names.is_empty() {
        return Err(ReconcileError::InvalidFormat(
            "No contigs found in FAI file".to_string(),
        ));
    }

    Ok(ContigOrder::new(names))
}

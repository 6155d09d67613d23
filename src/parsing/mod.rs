//! Parsers for the inputs of a reconciliation run.
//!
//! - **Contig order**: FASTA index (`.fai`), Picard `.dict`, or the `##contig`
//!   lines of a VCF header
//! - **Region sets**: BED-style interval lists
//! - **Variant records**: VCF-style data and header lines
//!
//! ## Example
//!
//! ```rust,no_run
//! use callset_diff::parsing::load_contig_order;
//! use std::path::Path;
//!
//! // A FASTA path resolves to its `.fai` sibling
//! let order = load_contig_order(Path::new("GRCh38.fa")).unwrap();
//! assert!(order.rank_of("chr1", "example").is_ok());
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::contig::ContigOrder;
use crate::core::error::{ReconcileError, Result};

pub mod bed;
pub mod dict;
pub mod fai;
pub mod vcf;

/// Load a contig order from a reference index path.
///
/// The format follows the extension: `.fai`, `.dict`, `.vcf`/`.vcf.gz`.
/// Any other path is taken to be a FASTA file and its `<path>.fai` is read.
///
/// # Errors
///
/// Returns `ReconcileError::Io` if no readable index exists, or the parse
/// error of the chosen format.
pub fn load_contig_order(path: &Path) -> Result<ContigOrder> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let order = if name.ends_with(".fai") {
        fai::parse_fai_file(path)?
    } else if name.ends_with(".dict") {
        dict::parse_dict_file(path)?
    } else if name.ends_with(".vcf") || name.ends_with(".vcf.gz") {
        vcf::parse_vcf_contig_file(path)?
    } else {
        let fai_path = fasta_index_path(path);
        if !fai_path.exists() {
            return Err(ReconcileError::io(
                fai_path,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "FASTA index not found; run `samtools faidx` on the reference",
                ),
            ));
        }
        fai::parse_fai_file(&fai_path)?
    };

    info!(path = %path.display(), contigs = order.len(), "Loaded contig order");
    Ok(order)
}

/// `<fasta>.fai`
fn fasta_index_path(fasta: &Path) -> PathBuf {
    let mut path = fasta.as_os_str().to_owned();
    path.push(".fai");
    PathBuf::from(path)
}

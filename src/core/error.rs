use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Error type for reading, ordering and joining variant streams
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// I/O failure on a named file
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record names a chromosome that the contig order does not know
    #[error("Contig '{name}' in {source_name} is not present in the reference index")]
    UnknownContig { name: String, source_name: String },

    /// A stream's coordinate went backwards under the contig order
    #[error(
        "{source_name} does not seem to be properly sorted: {current} follows {previous}"
    )]
    Unsorted {
        source_name: String,
        previous: String,
        current: String,
    },

    /// A data line could not be split into the expected columns
    #[error("Malformed record in {source_name} at line {line_number}: {reason}")]
    MalformedRecord {
        source_name: String,
        line_number: usize,
        reason: String,
    },

    /// A variant stream reached data lines without a `#CHROM` column header
    #[error("No #CHROM header line found in {source_name}")]
    MissingHeader { source_name: String },

    /// Index or region file content that cannot be interpreted
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl ReconcileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the ordering violation raised by the sorted reader
    #[must_use]
    pub fn is_unsorted(&self) -> bool {
        matches!(self, Self::Unsorted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsorted_message_names_source_and_coordinates() {
        let error = ReconcileError::Unsorted {
            source_name: "deep.vcf".to_string(),
            previous: "chr1:200".to_string(),
            current: "chr1:100".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("deep.vcf"));
        assert!(msg.contains("chr1:100 follows chr1:200"));
        assert!(error.is_unsorted());
    }

    #[test]
    fn test_malformed_record_message() {
        let error = ReconcileError::MalformedRecord {
            source_name: "gold.vcf".to_string(),
            line_number: 12,
            reason: "expected at least 8 columns, found 3".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("gold.vcf at line 12"));
        assert!(!error.is_unsorted());
    }
}

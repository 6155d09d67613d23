use serde::Serialize;

/// A genomic coordinate under a fixed contig order.
///
/// Field order matters: the derived `Ord` compares the contig rank first and
/// the position second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CoordinateKey {
    /// Rank of the chromosome in the contig order
    pub rank: usize,
    /// 1-based position
    pub position: u64,
}

impl CoordinateKey {
    #[must_use]
    pub fn new(rank: usize, position: u64) -> Self {
        Self { rank, position }
    }
}

/// Join key between probe and reference records.
///
/// Only the first alternate allele participates, so two records that differ
/// only in a second or later alternate compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantIdentity {
    pub key: CoordinateKey,
    pub reference_allele: String,
    pub first_alternate: String,
}

/// Outcome of testing one probe record against the reference side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    /// Same identity present on the reference side at this coordinate
    Matched,
    /// No reference record with this identity
    Unmatched,
}

/// How a region set relates to an unmatched record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    /// Inside an exclusion region; dropped from output
    Excluded,
    /// Outside every callable region; emitted with an extra flag
    NonCallable,
    /// No region set objects to the record
    Callable,
}

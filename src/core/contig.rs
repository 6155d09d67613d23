use std::collections::HashMap;

use crate::core::error::{ReconcileError, Result};
use crate::core::types::CoordinateKey;

/// Rank of every contig in a reference genome, in index order.
///
/// Built once per run and then only read. Every component that compares
/// coordinates across chromosomes borrows the same table.
#[derive(Debug, Clone, Default)]
pub struct ContigOrder {
    /// Contig names in rank order
    names: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl ContigOrder {
    /// Build the table from contig names in reference order.
    /// Repeated names keep the rank of their first occurrence.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Self::default();
        for name in names {
            let name = name.into();
            if !order.ranks.contains_key(&name) {
                order.ranks.insert(name.clone(), order.names.len());
                order.names.push(name);
            }
        }
        order
    }

    /// Rank of `name`, or `UnknownContig` if it was never registered.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::UnknownContig` naming `source_name` as the
    /// stream that referenced the contig.
    pub fn rank_of(&self, name: &str, source_name: &str) -> Result<usize> {
        self.ranks
            .get(name)
            .copied()
            .ok_or_else(|| ReconcileError::UnknownContig {
                name: name.to_string(),
                source_name: source_name.to_string(),
            })
    }

    /// Build the coordinate key for a chromosome and 1-based position
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::UnknownContig` when the chromosome is unknown.
    pub fn key(&self, chromosome: &str, position: u64, source_name: &str) -> Result<CoordinateKey> {
        Ok(CoordinateKey::new(
            self.rank_of(chromosome, source_name)?,
            position,
        ))
    }

    /// Contig name for a rank
    #[must_use]
    pub fn name_of(&self, rank: usize) -> Option<&str> {
        self.names.get(rank).map(String::as_str)
    }

    /// Human readable `chrom:pos` for a key, falling back to the raw rank
    #[must_use]
    pub fn describe(&self, key: CoordinateKey) -> String {
        match self.name_of(key.rank) {
            Some(name) => format!("{name}:{}", key.position),
            None => format!("#{}:{}", key.rank, key.position),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_follows_index_order() {
        let order = ContigOrder::new(["chr1", "chr2", "chrX", "chrM"]);
        assert_eq!(order.rank_of("chr1", "test").unwrap(), 0);
        assert_eq!(order.rank_of("chrX", "test").unwrap(), 2);
        assert_eq!(order.rank_of("chrM", "test").unwrap(), 3);
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let order = ContigOrder::new(["chr1", "chr2", "chr1", "chr3"]);
        assert_eq!(order.len(), 3);
        assert_eq!(order.rank_of("chr1", "test").unwrap(), 0);
        assert_eq!(order.rank_of("chr3", "test").unwrap(), 2);
    }

    #[test]
    fn test_unknown_contig_fails() {
        let order = ContigOrder::new(["chr1"]);
        let err = order.rank_of("chrUn_gl000220", "probe.vcf").unwrap_err();
        match err {
            ReconcileError::UnknownContig { name, source_name } => {
                assert_eq!(name, "chrUn_gl000220");
                assert_eq!(source_name, "probe.vcf");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_lexicographic_order() {
        // chr10 sorts after chr2 because the index says so, not because of its name
        let order = ContigOrder::new(["chr1", "chr2", "chr10"]);
        let a = order.key("chr2", 500, "test").unwrap();
        let b = order.key("chr10", 1, "test").unwrap();
        assert!(a < b);
        assert_eq!(order.describe(b), "chr10:1");
    }
}

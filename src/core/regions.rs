use std::collections::HashMap;

use crate::core::types::RegionStatus;

/// A BED-style interval: 0-based, half-open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            contig: contig.into(),
            start,
            end,
        }
    }
}

/// Read-only interval set answering point queries by 1-based position.
///
/// Overlapping and adjacent intervals are merged per contig at construction,
/// so a query is one binary search.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    by_contig: HashMap<String, Vec<(u64, u64)>>,
}

impl RegionSet {
    pub fn new(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut by_contig: HashMap<String, Vec<(u64, u64)>> = HashMap::new();
        for interval in intervals {
            if interval.end > interval.start {
                by_contig
                    .entry(interval.contig)
                    .or_default()
                    .push((interval.start, interval.end));
            }
        }

        for spans in by_contig.values_mut() {
            spans.sort_unstable();
            let mut merged: Vec<(u64, u64)> = Vec::with_capacity(spans.len());
            for &(start, end) in spans.iter() {
                match merged.last_mut() {
                    Some(last) if start <= last.1 => last.1 = last.1.max(end),
                    _ => merged.push((start, end)),
                }
            }
            *spans = merged;
        }

        Self { by_contig }
    }

    /// True if the 1-based `position` on `contig` lies in any interval.
    ///
    /// Position `p` covers the 0-based base `p - 1`, so it is inside
    /// `[start, end)` when `start < p <= end`.
    #[must_use]
    pub fn contains(&self, contig: &str, position: u64) -> bool {
        let Some(spans) = self.by_contig.get(contig) else {
            return false;
        };
        let Some(base) = position.checked_sub(1) else {
            return false;
        };
        // First span starting after `base`; the candidate is the one before it
        let idx = spans.partition_point(|&(start, _)| start <= base);
        idx > 0 && base < spans[idx - 1].1
    }

    /// Number of merged intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_contig.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_contig.is_empty()
    }
}

/// Exclusion and callable region sets consulted for unmatched records
#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    exclusions: Option<RegionSet>,
    callable: Option<RegionSet>,
}

impl RegionFilter {
    #[must_use]
    pub fn new(exclusions: Option<RegionSet>, callable: Option<RegionSet>) -> Self {
        Self {
            exclusions,
            callable,
        }
    }

    /// Classify a coordinate. Exclusion takes precedence over callability.
    #[must_use]
    pub fn classify(&self, contig: &str, position: u64) -> RegionStatus {
        if self
            .exclusions
            .as_ref()
            .is_some_and(|set| set.contains(contig, position))
        {
            return RegionStatus::Excluded;
        }
        match &self.callable {
            Some(set) if !set.contains(contig, position) => RegionStatus::NonCallable,
            _ => RegionStatus::Callable,
        }
    }
}

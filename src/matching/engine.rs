use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::trace;

use crate::core::error::Result;
use crate::core::record::VariantRecord;
use crate::core::types::{CoordinateKey, JoinStatus, VariantIdentity};
use crate::stream::grouper::CoordinateBatch;

/// A probe record tagged with the outcome of the join
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub record: VariantRecord,
    pub status: JoinStatus,
}

/// Counters accumulated while joining
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub probe_batches: usize,
    pub probe_records: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Reference batches pulled, including ones with no probe counterpart
    pub reference_batches: usize,
}

/// Current reference batch, reduced to what membership tests need
struct ReferenceWindow {
    key: CoordinateKey,
    identities: HashSet<VariantIdentity>,
}

impl From<CoordinateBatch> for ReferenceWindow {
    fn from(batch: CoordinateBatch) -> Self {
        Self {
            key: batch.key(),
            identities: batch.records().iter().map(VariantRecord::identity).collect(),
        }
    }
}

/// Joins a probe and a reference batch stream over the same contig order.
///
/// Each probe record is yielded once, in probe order, tagged
/// [`JoinStatus::Matched`] when a reference record at the same coordinate has
/// the same [`VariantIdentity`]. The reference side is only advanced while it
/// is behind the current probe coordinate, so both streams are read once,
/// front to back. Reference-only coordinates are skipped.
///
/// Any error from either stream is yielded once and ends the join.
pub struct StreamJoinEngine<P, Q> {
    probe: P,
    reference: Q,
    window: Option<ReferenceWindow>,
    reference_exhausted: bool,
    /// Tagged records of the current probe batch not yet yielded
    ready: VecDeque<JoinedRecord>,
    stats: JoinStats,
    failed: bool,
}

impl<P, Q> StreamJoinEngine<P, Q>
where
    P: Iterator<Item = Result<CoordinateBatch>>,
    Q: Iterator<Item = Result<CoordinateBatch>>,
{
    pub fn new(probe: P, reference: Q) -> Self {
        Self {
            probe,
            reference,
            window: None,
            reference_exhausted: false,
            ready: VecDeque::new(),
            stats: JoinStats::default(),
            failed: false,
        }
    }

    #[must_use]
    pub fn stats(&self) -> JoinStats {
        self.stats
    }

    /// Move the reference window forward until it is at or past `key`
    fn advance_reference(&mut self, key: CoordinateKey) -> Result<()> {
        while !self.reference_exhausted {
            if self.window.as_ref().is_some_and(|w| w.key >= key) {
                break;
            }
            match self.reference.next() {
                Some(batch) => {
                    self.window = Some(ReferenceWindow::from(batch?));
                    self.stats.reference_batches += 1;
                }
                None => {
                    self.reference_exhausted = true;
                    self.window = None;
                }
            }
        }
        Ok(())
    }

    fn join_batch(&mut self, batch: CoordinateBatch) -> Result<()> {
        let key = batch.key();
        self.advance_reference(key)?;

        let window = self.window.as_ref().filter(|w| w.key == key);
        self.stats.probe_batches += 1;

        for record in batch.into_records() {
            let matched = window.is_some_and(|w| w.identities.contains(&record.identity()));
            let status = if matched {
                self.stats.matched += 1;
                JoinStatus::Matched
            } else {
                self.stats.unmatched += 1;
                JoinStatus::Unmatched
            };
            self.stats.probe_records += 1;
            trace!(chrom = %record.chromosome, pos = record.position, ?status, "Joined probe record");
            self.ready.push_back(JoinedRecord { record, status });
        }
        Ok(())
    }
}

impl<P, Q> Iterator for StreamJoinEngine<P, Q>
where
    P: Iterator<Item = Result<CoordinateBatch>>,
    Q: Iterator<Item = Result<CoordinateBatch>>,
{
    type Item = Result<JoinedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(joined) = self.ready.pop_front() {
                return Some(Ok(joined));
            }
            if self.failed {
                return None;
            }

            let batch = match self.probe.next()? {
                Ok(batch) => batch,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            if let Err(e) = self.join_batch(batch) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReconcileError;
    use crate::stream::grouper::CoordinateGrouper;

    fn record(rank: usize, position: u64, reference: &str, alternate: &str) -> VariantRecord {
        VariantRecord {
            key: CoordinateKey::new(rank, position),
            chromosome: format!("chr{}", rank + 1),
            position,
            id: ".".to_string(),
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            quality: ".".to_string(),
            filter: ".".to_string(),
            info: ".".to_string(),
            format: Vec::new(),
            samples: Vec::new(),
            line: String::new(),
        }
    }

    fn batches(
        records: Vec<VariantRecord>,
    ) -> CoordinateGrouper<impl Iterator<Item = Result<VariantRecord>>> {
        CoordinateGrouper::new(records.into_iter().map(Ok))
    }

    fn join(
        probe: Vec<VariantRecord>,
        reference: Vec<VariantRecord>,
    ) -> (Vec<(String, JoinStatus)>, JoinStats) {
        let mut engine = StreamJoinEngine::new(batches(probe), batches(reference));
        let joined: Vec<_> = engine
            .by_ref()
            .map(|j| {
                let j = j.unwrap();
                (
                    format!("{}:{}:{}>{}", j.record.chromosome, j.record.position, j.record.reference, j.record.alternate),
                    j.status,
                )
            })
            .collect();
        (joined, engine.stats())
    }

    #[test]
    fn test_same_coordinate_mixed_outcome() {
        let (joined, stats) = join(
            vec![record(0, 100, "A", "T"), record(0, 100, "A", "G")],
            vec![record(0, 100, "A", "T")],
        );
        assert_eq!(
            joined,
            vec![
                ("chr1:100:A>T".to_string(), JoinStatus::Matched),
                ("chr1:100:A>G".to_string(), JoinStatus::Unmatched),
            ]
        );
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.probe_batches, 1);
    }

    #[test]
    fn test_reference_missing_whole_contig() {
        let (joined, _) = join(
            vec![record(1, 50, "C", "T")],
            vec![record(0, 10, "C", "T"), record(2, 50, "C", "T")],
        );
        assert_eq!(joined, vec![("chr2:50:C>T".to_string(), JoinStatus::Unmatched)]);
    }

    #[test]
    fn test_reference_only_records_are_skipped() {
        let (joined, stats) = join(
            vec![record(0, 30, "G", "A")],
            vec![
                record(0, 10, "C", "T"),
                record(0, 20, "C", "T"),
                record(0, 30, "G", "A"),
                record(0, 40, "C", "T"),
            ],
        );
        assert_eq!(joined, vec![("chr1:30:G>A".to_string(), JoinStatus::Matched)]);
        // The reference is not read past the last probe coordinate
        assert_eq!(stats.reference_batches, 3);
    }

    #[test]
    fn test_empty_reference_leaves_everything_unmatched() {
        let (joined, stats) = join(
            vec![record(0, 1, "A", "C"), record(0, 1, "A", "G"), record(0, 2, "A", "T")],
            Vec::new(),
        );
        assert!(joined.iter().all(|(_, s)| *s == JoinStatus::Unmatched));
        assert_eq!(stats.probe_records, 3);
        assert_eq!(stats.probe_batches, 2);
    }

    #[test]
    fn test_identity_ignores_later_alternates() {
        let (joined, _) = join(
            vec![record(0, 100, "A", "T,C")],
            vec![record(0, 100, "A", "T,G")],
        );
        assert_eq!(joined[0].1, JoinStatus::Matched);
    }

    #[test]
    fn test_reference_ahead_of_probe() {
        let (joined, _) = join(
            vec![record(0, 5, "A", "T"), record(0, 500, "A", "T")],
            vec![record(0, 100, "A", "T"), record(0, 500, "A", "T")],
        );
        assert_eq!(joined[0].1, JoinStatus::Unmatched);
        assert_eq!(joined[1].1, JoinStatus::Matched);
    }

    #[test]
    fn test_reference_error_is_fatal() {
        let probe = batches(vec![record(0, 100, "A", "T")]);
        let reference = CoordinateGrouper::new(
            vec![Err(ReconcileError::UnknownContig {
                name: "chrZ".to_string(),
                source_name: "gold".to_string(),
            })]
            .into_iter(),
        );
        let mut engine = StreamJoinEngine::new(probe, reference);
        assert!(matches!(
            engine.next(),
            Some(Err(ReconcileError::UnknownContig { .. }))
        ));
        assert!(engine.next().is_none());
    }
}

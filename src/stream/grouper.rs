use crate::core::error::Result;
use crate::core::record::VariantRecord;
use crate::core::types::CoordinateKey;

/// Consecutive records sharing one coordinate, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateBatch {
    key: CoordinateKey,
    records: Vec<VariantRecord>,
}

impl CoordinateBatch {
    fn new(seed: VariantRecord) -> Self {
        Self {
            key: seed.key,
            records: vec![seed],
        }
    }

    #[must_use]
    pub fn key(&self) -> CoordinateKey {
        self.key
    }

    #[must_use]
    pub fn records(&self) -> &[VariantRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<VariantRecord> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Groups a sorted record stream into one [`CoordinateBatch`] per distinct
/// coordinate.
///
/// The record that ends a batch is held back as the seed of the next one, so
/// nothing is read beyond the first record of the following coordinate.
pub struct CoordinateGrouper<I> {
    records: I,
    /// Record read past the end of the previous batch
    seed: Option<VariantRecord>,
    done: bool,
}

impl<I> CoordinateGrouper<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    pub fn new(records: I) -> Self {
        Self {
            records,
            seed: None,
            done: false,
        }
    }
}

impl<I> Iterator for CoordinateGrouper<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    type Item = Result<CoordinateBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let seed = match self.seed.take() {
            Some(record) => record,
            None => match self.records.next() {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            },
        };

        let mut batch = CoordinateBatch::new(seed);
        loop {
            match self.records.next() {
                Some(Ok(record)) if record.key == batch.key => batch.records.push(record),
                Some(Ok(record)) => {
                    self.seed = Some(record);
                    break;
                }
                // The batch in progress is abandoned; a stream error ends everything
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => break,
            }
        }
        Some(Ok(batch))
    }
}

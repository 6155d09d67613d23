use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::core::contig::ContigOrder;
use crate::core::error::{ReconcileError, Result};
use crate::core::record::{VariantHeader, VariantRecord};
use crate::core::types::CoordinateKey;
use crate::parsing::vcf::{parse_column_header, parse_record_line};
use crate::utils::io::open_text;

/// Lazily yields records from one variant stream, checking on every record
/// that coordinates never decrease under the contig order.
///
/// The header is consumed on construction. Comment lines among the data are
/// skipped. The first error ends the stream: after an `Err` item the
/// iterator only returns `None`.
pub struct SortedRecordReader<'a, R> {
    lines: std::io::Lines<R>,
    order: &'a ContigOrder,
    source_name: String,
    header: VariantHeader,
    /// First data line, read while looking for the end of the header
    pending: Option<String>,
    previous: Option<CoordinateKey>,
    line_number: usize,
    records_read: usize,
    done: bool,
}

impl<'a> SortedRecordReader<'a, Box<dyn BufRead>> {
    /// Open a plain or gzipped file
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Io` if the file cannot be opened, or
    /// `ReconcileError::MissingHeader` if it has no `#CHROM` line.
    pub fn open(path: &Path, order: &'a ContigOrder) -> Result<Self> {
        let reader = open_text(path)?;
        Self::new(reader, path.display().to_string(), order)
    }
}

impl<'a, R: BufRead> SortedRecordReader<'a, R> {
    /// Wrap a reader and consume its header section
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Io` on read failure, or
    /// `ReconcileError::MissingHeader` when a data line (or end of input)
    /// comes before the `#CHROM` line.
    pub fn new(reader: R, source_name: impl Into<String>, order: &'a ContigOrder) -> Result<Self> {
        let mut stream = Self {
            lines: reader.lines(),
            order,
            source_name: source_name.into(),
            header: VariantHeader::default(),
            pending: None,
            previous: None,
            line_number: 0,
            records_read: 0,
            done: false,
        };
        stream.read_header()?;
        Ok(stream)
    }

    fn read_header(&mut self) -> Result<()> {
        while let Some(line) = self.next_line()? {
            if line.starts_with("##") {
                self.header.metadata.push(line);
            } else if line.starts_with('#') {
                self.header.samples = parse_column_header(&line);
                self.header.column_line = line;
                debug!(
                    source = %self.source_name,
                    samples = self.header.samples.len(),
                    "Read variant header"
                );
                return Ok(());
            } else if !line.is_empty() {
                self.pending = Some(line);
                break;
            }
        }
        Err(ReconcileError::MissingHeader {
            source_name: self.source_name.clone(),
        })
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            None => Ok(None),
            Some(Err(e)) => Err(ReconcileError::io(self.source_name.as_str(), e)),
            Some(Ok(mut line)) => {
                self.line_number += 1;
                if line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<VariantRecord>> {
        loop {
            let line = match self.pending.take() {
                Some(line) => line,
                None => match self.next_line()? {
                    Some(line) => line,
                    None => return Ok(None),
                },
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let record = parse_record_line(&line, self.line_number, &self.source_name, self.order)?;
            if let Some(previous) = self.previous {
                if record.key < previous {
                    return Err(ReconcileError::Unsorted {
                        source_name: self.source_name.clone(),
                        previous: self.order.describe(previous),
                        current: self.order.describe(record.key),
                    });
                }
            }
            self.previous = Some(record.key);
            self.records_read += 1;
            return Ok(Some(record));
        }
    }

    #[must_use]
    pub fn header(&self) -> &VariantHeader {
        &self.header
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Records yielded so far
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: BufRead> Iterator for SortedRecordReader<'_, R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

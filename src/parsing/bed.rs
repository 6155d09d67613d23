//! Parser for BED-style region lists.
//!
//! Records are read with the noodles BED3 reader, 0-based half-open. `track`,
//! `browser` and `#` lines are dropped before the reader sees them, wherever
//! they appear.

use std::io::BufRead;
use std::path::Path;

use noodles::bed;
use tracing::debug;

use crate::core::error::{ReconcileError, Result};
use crate::core::regions::{Interval, RegionSet};
use crate::utils::io::open_text;

/// Read a region file (plain or gzip) into a `RegionSet`
///
/// # Errors
///
/// Returns `ReconcileError::Io` on read failure or
/// `ReconcileError::InvalidFormat` for lines that are not intervals.
pub fn parse_bed_file(path: &Path) -> Result<RegionSet> {
    let reader = open_text(path)?;
    let mut lines = RegionLines::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ReconcileError::io(path, e))?;
        lines.push(&line, i + 1);
    }

    let intervals = lines.read_intervals()?;
    debug!(path = %path.display(), intervals = intervals.len(), "Loaded region file");
    Ok(RegionSet::new(intervals))
}

/// Parse region text into a `RegionSet`
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` for lines that are not intervals.
pub fn parse_bed_text(text: &str) -> Result<RegionSet> {
    let mut lines = RegionLines::default();
    for (i, line) in text.lines().enumerate() {
        lines.push(line, i + 1);
    }
    Ok(RegionSet::new(lines.read_intervals()?))
}

fn is_header_line(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

/// Data lines of a region file with their 1-based line numbers
#[derive(Default)]
struct RegionLines {
    text: String,
    line_numbers: Vec<usize>,
}

impl RegionLines {
    fn push(&mut self, line: &str, line_num: usize) {
        let line = line.trim_end();
        if is_header_line(line) {
            return;
        }
        self.text.push_str(line);
        self.text.push('\n');
        self.line_numbers.push(line_num);
    }

    fn read_intervals(&self) -> Result<Vec<Interval>> {
        let mut reader = bed::io::Reader::<3, _>::new(self.text.as_bytes());
        let mut record = bed::Record::<3>::default();
        let mut intervals = Vec::with_capacity(self.line_numbers.len());

        for &line_num in &self.line_numbers {
            match reader.read_record(&mut record) {
                Ok(0) => break,
                Ok(_) => intervals.push(to_interval(&record, line_num)?),
                Err(e) => return Err(invalid_region(line_num, &e)),
            }
        }

        Ok(intervals)
    }
}

fn invalid_region(line_num: usize, reason: &dyn std::fmt::Display) -> ReconcileError {
    ReconcileError::InvalidFormat(format!("Invalid region on line {line_num}: {reason}"))
}

fn to_interval(record: &bed::Record<3>, line_num: usize) -> Result<Interval> {
    let contig = String::from_utf8_lossy(record.reference_sequence_name()).into_owned();

    // noodles reports the 0-based start as a 1-based position
    let start = record
        .feature_start()
        .map_err(|e| invalid_region(line_num, &e))?;
    let end = record
        .feature_end()
        .ok_or_else(|| invalid_region(line_num, &"missing end"))?
        .map_err(|e| invalid_region(line_num, &e))?;

    let start = (usize::from(start) - 1) as u64;
    let end = usize::from(end) as u64;
    if end < start {
        return Err(invalid_region(
            line_num,
            &format!("ends before it starts: {start}-{end}"),
        ));
    }

    Ok(Interval::new(contig, start, end))
}

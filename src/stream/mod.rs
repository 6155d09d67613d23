//! Streaming access to coordinate-sorted variant files.
//!
//! [`SortedRecordReader`](reader::SortedRecordReader) yields one record at a
//! time and fails on the first coordinate regression.
//! [`CoordinateGrouper`](grouper::CoordinateGrouper) turns that into one batch
//! per distinct coordinate. Both hold at most one record of look-ahead.

pub mod grouper;
pub mod reader;

pub use grouper::{CoordinateBatch, CoordinateGrouper};
pub use reader::SortedRecordReader;

//! # callset-diff
//!
//! A library for reconciling coordinate-sorted variant call sets.
//!
//! Given a *probe* call set and a *reference* call set over the same genome,
//! `callset-diff` walks both files once, front to back, and reports every probe
//! call that has no counterpart in the reference. Each such call is written as
//! a well-formed record marked for later review.
//!
//! ## Features
//!
//! - **Contig-aware ordering**: Coordinates compare by contig rank from a FASTA
//!   index, sequence dictionary, or VCF header, never by name
//! - **Sort validation**: Every record is checked against its predecessor; a
//!   regression stops the run with the offending coordinate
//! - **Same-coordinate grouping**: Multi-allelic and multi-caller records at one
//!   position are joined as a batch
//! - **Streaming join**: One pass over each input, no random access
//! - **Region filtering**: Optional exclusion and callable interval sets
//! - **Gzip support**: Compressed inputs are detected automatically
//!
//! ## Example
//!
//! ```rust,no_run
//! use callset_diff::{ContigOrder, CoordinateGrouper, SortedRecordReader, StreamJoinEngine};
//! use callset_diff::core::types::JoinStatus;
//! use std::path::Path;
//!
//! let order = ContigOrder::new(["chr1", "chr2", "chrX"]);
//! let probe = SortedRecordReader::open(Path::new("deep.vcf"), &order).unwrap();
//! let reference = SortedRecordReader::open(Path::new("gold.vcf"), &order).unwrap();
//!
//! let engine = StreamJoinEngine::new(
//!     CoordinateGrouper::new(probe),
//!     CoordinateGrouper::new(reference),
//! );
//! for joined in engine {
//!     let joined = joined.unwrap();
//!     if joined.status == JoinStatus::Unmatched {
//!         println!("{}:{}", joined.record.chromosome, joined.record.position);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Contig order, coordinates, records, regions and errors
//! - [`parsing`]: Parsers for reference indexes, region files and variant lines
//! - [`stream`]: Sorted record reader and coordinate grouper
//! - [`matching`]: Join engine, record synthesis and the discovery pipeline
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod stream;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::contig::ContigOrder;
pub use core::error::{ReconcileError, Result};
pub use core::record::{SampleSchema, VariantRecord};
pub use core::regions::{RegionFilter, RegionSet};
pub use core::types::{CoordinateKey, VariantIdentity};
pub use matching::engine::{JoinedRecord, StreamJoinEngine};
pub use matching::synthesis::{RecordSynthesizer, SynthesizedRecord};
pub use stream::{CoordinateBatch, CoordinateGrouper, SortedRecordReader};

//! Core data types for variant stream reconciliation.
//!
//! - [`ContigOrder`](contig::ContigOrder): rank of each contig in the reference index
//! - [`CoordinateKey`](types::CoordinateKey): `(rank, position)` with a total order
//! - [`VariantRecord`](record::VariantRecord): one parsed data line
//! - [`SampleSchema`](record::SampleSchema): sample name to column index, resolved once per stream
//! - [`RegionFilter`](regions::RegionFilter): exclusion / callable interval sets
//! - [`ReconcileError`](error::ReconcileError): the error taxonomy shared by all stages
//!
//! ## Coordinates
//!
//! Variant positions are 1-based; region intervals are 0-based half-open, as in
//! BED. Chromosomes compare by their rank in the reference index, never by name,
//! so `chr10` follows `chr9` only if the index says so.

pub mod contig;
pub mod error;
pub mod record;
pub mod regions;
pub mod types;

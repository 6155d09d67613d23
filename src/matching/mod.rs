//! Probe-versus-reference join and output synthesis.
//!
//! - [`StreamJoinEngine`](engine::StreamJoinEngine): lock-step join of two
//!   coordinate-batched streams
//! - [`RecordSynthesizer`](synthesis::RecordSynthesizer): output lines for
//!   unmatched probe records
//! - [`run_discovery`](discovery::run_discovery): the whole pipeline from
//!   paths to an output file
//!
//! ## Join Algorithm
//!
//! For each probe batch the reference side is advanced while its coordinate is
//! strictly behind the probe coordinate. If the reference then sits on the same
//! coordinate, each probe record is looked up by its
//! [`VariantIdentity`](crate::core::types::VariantIdentity) (coordinate,
//! reference allele, first alternate allele); otherwise the whole batch is
//! unmatched. Sample columns never take part in the comparison.
//!
//! ## Example
//!
//! ```rust,no_run
//! use callset_diff::matching::discovery::{run_discovery, DiscoveryConfig};
//!
//! let config = DiscoveryConfig::new(
//!     "deep.vcf.gz",
//!     "gold.vcf.gz",
//!     "deep_only.vcf",
//!     "MSDUKT",
//!     "GRCh38.fa.fai",
//! );
//! let summary = run_discovery(&config).unwrap();
//! println!("{} probe calls absent from the reference", summary.join.unmatched);
//! ```

pub mod discovery;
pub mod engine;
pub mod synthesis;

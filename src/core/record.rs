use std::collections::HashMap;

use crate::core::types::{CoordinateKey, VariantIdentity};

/// Column index of the first sample in a VCF-style line
pub const FIRST_SAMPLE_COLUMN: usize = 9;

/// Number of fixed positional columns (CHROM..INFO)
pub const FIXED_COLUMNS: usize = 8;

/// Sample name to sample-column mapping, resolved once from the `#CHROM` line.
///
/// Indices are relative to the first sample column, so index 0 is column 9.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SampleSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { names, index }
    }

    /// Sample index for a sample name, if the column exists
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Header section of a variant stream
#[derive(Debug, Clone, Default)]
pub struct VariantHeader {
    /// `##` metadata lines, verbatim, without line terminators
    pub metadata: Vec<String>,
    /// The `#CHROM` column header line, verbatim
    pub column_line: String,
    /// Sample columns named by the column header line
    pub samples: SampleSchema,
}

/// One parsed data line of a variant stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub key: CoordinateKey,
    pub chromosome: String,
    pub position: u64,
    pub id: String,
    pub reference: String,
    /// Comma-separated alternate alleles as written
    pub alternate: String,
    pub quality: String,
    pub filter: String,
    pub info: String,
    /// FORMAT keys, in order
    pub format: Vec<String>,
    /// Raw per-sample columns, colon-delimited in FORMAT order
    pub samples: Vec<String>,
    /// The source line without its terminator
    pub line: String,
}

impl VariantRecord {
    /// First listed alternate allele
    #[must_use]
    pub fn first_alternate(&self) -> &str {
        self.alternate.split(',').next().unwrap_or_default()
    }

    #[must_use]
    pub fn identity(&self) -> VariantIdentity {
        VariantIdentity {
            key: self.key,
            reference_allele: self.reference.clone(),
            first_alternate: self.first_alternate().to_string(),
        }
    }

    /// Value of FORMAT sub-field `field` for sample `sample_index`.
    ///
    /// `None` when the record has no such FORMAT key, no such sample column,
    /// or the sample value is truncated before that key.
    #[must_use]
    pub fn sample_value(&self, field: &str, sample_index: usize) -> Option<&str> {
        let field_index = self.format.iter().position(|key| key == field)?;
        self.samples
            .get(sample_index)?
            .split(':')
            .nth(field_index)
    }

    /// CHROM, POS, ID, REF, ALT and QUAL exactly as written in the source line
    #[must_use]
    pub fn site_columns(&self) -> &str {
        let end = self
            .line
            .match_indices('\t')
            .nth(5)
            .map_or(self.line.len(), |(i, _)| i);
        &self.line[..end]
    }
}

use std::path::Path;

use crate::core::contig::ContigOrder;
use crate::core::error::{ReconcileError, Result};

/// Parse a Picard sequence dictionary (.dict) file
///
/// # Errors
///
/// Returns `ReconcileError::Io` if the file cannot be read, or
/// `ReconcileError::InvalidFormat` if no `@SQ` lines are found.
pub fn parse_dict_file(path: &Path) -> Result<ContigOrder> {
    let content = std::fs::read_to_string(path).map_err(|e| ReconcileError::io(path, e))?;
    parse_dict_text(&content)
}

/// Parse dictionary from text. Contig order is the order of `@SQ` lines.
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` if an `@SQ` line has no `SN` tag
/// or no `@SQ` lines are present.
pub fn parse_dict_text(text: &str) -> Result<ContigOrder> {
    let mut names = Vec::new();

    for line in text.lines() {
        if !line.starts_with("@SQ") {
            continue;
        }

        let name = line
            .split('\t')
            .find_map(|field| field.strip_prefix("SN:"))
            .ok_or_else(|| {
                ReconcileError::InvalidFormat(format!("@SQ line without SN tag: {line}"))
            })?;
        names.push(name.to_string());
    }

    if names.is_empty() {
        return Err(ReconcileError::InvalidFormat(
            "No @SQ lines found in sequence dictionary".to_string(),
        ));
    }

    Ok(ContigOrder::new(names))
}

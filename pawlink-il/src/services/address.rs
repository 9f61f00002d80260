//! Address canonicalization
//!
//! Assembles the raw address-related columns of one record into a single
//! canonical string and expands it into standardized candidate forms. The
//! candidate sequence (not any single string) is the authoritative match-key
//! representation for the address.

use crate::services::expansion::AddressExpander;
use crate::services::normalizer::{filter_symbols, normalize, DEFAULT_ALLOWED};

/// Canonicalize the ordered raw address components of one record.
///
/// **Algorithm:**
/// 1. Normalize and symbol-filter each component independently.
/// 2. Join with single spaces and re-normalize (collapses doubled spaces
///    left by empty components).
/// 3. Expand through the expansion boundary into ordered candidates.
///
/// Empty input yields a one-element sequence containing the empty string,
/// never an empty sequence, so downstream logic never special-cases "no
/// candidates." Expansion failure (error or zero candidates) degrades to
/// the pre-expansion canonical string as the sole candidate.
pub fn canonicalize_address(components: &[&str], expander: &dyn AddressExpander) -> Vec<String> {
    let joined = components
        .iter()
        .map(|c| filter_symbols(&normalize(c), DEFAULT_ALLOWED))
        .collect::<Vec<_>>()
        .join(" ");
    let canonical = normalize(&joined);

    if canonical.is_empty() {
        return vec![String::new()];
    }

    match expander.expand(&canonical, &["en"]) {
        Ok(candidates) if !candidates.is_empty() => candidates,
        Ok(_) => {
            tracing::warn!(address = %canonical, "Expansion returned no candidates, using canonical string");
            vec![canonical]
        }
        Err(e) => {
            tracing::warn!(address = %canonical, error = %e, "Expansion failed, using canonical string");
            vec![canonical]
        }
    }
}

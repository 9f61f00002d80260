//! Field normalization and symbol filtering
//!
//! The first two stages of match-key derivation. Both are pure functions:
//! `normalize` canonicalizes case and whitespace, `filter_symbols` restricts
//! a normalized value to an allowed character set. Emails skip the symbol
//! filter entirely (their meaningful characters would be stripped) and pass
//! through `normalize` only.

/// Default allowed character set: appropriate for names, phones, addresses
pub const DEFAULT_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyz0123456789 -";

/// Canonicalize a free-text value for comparison.
///
/// Lowercases, strips leading/trailing whitespace, and collapses any run of
/// interior whitespace to a single space. Idempotent.
pub fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

/// `normalize` over an optional value; missing input yields the empty string
/// so downstream concatenation and comparison never fail on absent data.
pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize).unwrap_or_default()
}

/// Remove every character not in `allowed`, preserving the relative order
/// of kept characters.
pub fn filter_symbols(value: &str, allowed: &str) -> String {
    value.chars().filter(|c| allowed.contains(*c)).collect()
}

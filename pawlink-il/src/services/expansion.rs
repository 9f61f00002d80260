//! Address-expansion boundary
//!
//! Expansion is an external capability behind the `AddressExpander` trait:
//! the canonicalizer prepares input for it and recovers when it fails. The
//! shipped `EnglishExpander` handles the English-language rules the source
//! datasets need: street-type and directional abbreviations, unit
//! designators, and ZIP+4 truncation. Ambiguous abbreviations legitimately
//! yield more than one candidate, so the output is an ordered sequence.

use pawlink_common::Result;

/// Language-aware postal-address expansion.
///
/// Takes a normalized address string and a language list, returns an
/// ordered sequence of standardized candidate strings.
pub trait AddressExpander: Send + Sync {
    fn expand(&self, address: &str, languages: &[&str]) -> Result<Vec<String>>;
}

/// Per-token expansion options. The first option is the preferred
/// standardized form; additional options capture genuine ambiguity.
fn token_options(token: &str) -> Vec<&str> {
    match token {
        // "st" is ambiguous: street type or saint (as in "st paul ave")
        "st" => vec!["street", "saint"],
        "ave" | "av" => vec!["avenue"],
        "rd" => vec!["road"],
        "dr" => vec!["drive"],
        "blvd" => vec!["boulevard"],
        "ln" => vec!["lane"],
        "ct" => vec!["court"],
        "cir" => vec!["circle"],
        "pl" => vec!["place"],
        "ter" | "terr" => vec!["terrace"],
        "hwy" => vec!["highway"],
        "pkwy" => vec!["parkway"],
        "sq" => vec!["square"],
        "trl" => vec!["trail"],
        "n" => vec!["north"],
        "s" => vec!["south"],
        "e" => vec!["east"],
        "w" => vec!["west"],
        "ne" => vec!["northeast"],
        "nw" => vec!["northwest"],
        "se" => vec!["southeast"],
        "sw" => vec!["southwest"],
        "apt" => vec!["apartment"],
        "ste" => vec!["suite"],
        "bldg" => vec!["building"],
        "fl" => vec!["floor"],
        "rm" => vec!["room"],
        _ => vec![],
    }
}

/// Truncate a postal-code token to its leading five digits.
///
/// Trailing add-on codes (ZIP+4) are unreliable across sources, so
/// "12345-6789" and "123456789" both reduce to "12345".
fn truncate_postal_code(token: &str) -> &str {
    let digits_then_sep = token.len() > 5
        && token.chars().take(5).all(|c| c.is_ascii_digit())
        && token[5..].chars().all(|c| c.is_ascii_digit() || c == '-');
    if digits_then_sep {
        &token[..5]
    } else {
        token
    }
}

/// English-language address expander.
///
/// Expands whole tokens only (word boundaries are spaces after
/// normalization), so "stone ave" never becomes "saintone avenue".
#[derive(Debug, Default)]
pub struct EnglishExpander;

/// Ceiling on combinatorial candidates from multiple ambiguous tokens
const MAX_CANDIDATES: usize = 8;

impl EnglishExpander {
    pub fn new() -> Self {
        Self
    }
}

impl AddressExpander for EnglishExpander {
    /// **Algorithm:**
    /// 1. If no English language requested, return the input unchanged.
    /// 2. Truncate postal-code tokens to five digits.
    /// 3. Expand each token to its standardized option(s); ambiguous tokens
    ///    fan out into multiple candidates (capped, preferred form first).
    /// 4. Append the post-truncation input itself as a trailing candidate,
    ///    de-duplicated, so exact-string matching always remains possible.
    fn expand(&self, address: &str, languages: &[&str]) -> Result<Vec<String>> {
        if !languages.iter().any(|l| l.starts_with("en")) {
            return Ok(vec![address.to_string()]);
        }

        let tokens: Vec<&str> = address
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(truncate_postal_code)
            .collect();

        // Candidate token sequences, fanned out over ambiguous tokens
        let mut sequences: Vec<Vec<&str>> = vec![Vec::with_capacity(tokens.len())];
        for &token in &tokens {
            let options = token_options(token);
            if options.is_empty() {
                for seq in &mut sequences {
                    seq.push(token);
                }
            } else {
                let mut fanned = Vec::with_capacity(sequences.len() * options.len());
                for seq in &sequences {
                    for &option in &options {
                        if fanned.len() >= MAX_CANDIDATES {
                            break;
                        }
                        let mut next = seq.clone();
                        next.push(option);
                        fanned.push(next);
                    }
                }
                sequences = fanned;
            }
        }

        let mut candidates: Vec<String> = Vec::with_capacity(sequences.len() + 1);
        for seq in sequences {
            let joined = seq.join(" ");
            if !candidates.contains(&joined) {
                candidates.push(joined);
            }
        }
        let literal = tokens.join(" ");
        if !candidates.contains(&literal) {
            candidates.push(literal);
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(address: &str) -> Vec<String> {
        EnglishExpander::new().expand(address, &["en"]).unwrap()
    }

    #[test]
    fn test_street_type_expansion() {
        let candidates = expand("123 main st");
        assert_eq!(candidates[0], "123 main street");
        assert!(candidates.contains(&"123 main st".to_string()));
    }

    #[test]
    fn test_ambiguous_st_fans_out() {
        let candidates = expand("10 st paul ave");
        assert!(candidates.contains(&"10 street paul avenue".to_string()));
        assert!(candidates.contains(&"10 saint paul avenue".to_string()));
    }

    #[test]
    fn test_directional_prefix() {
        let candidates = expand("456 n oak dr");
        assert_eq!(candidates[0], "456 north oak drive");
    }

    #[test]
    fn test_unit_designator() {
        let candidates = expand("789 elm street apt 4b");
        assert_eq!(candidates[0], "789 elm street apartment 4b");
    }

    #[test]
    fn test_zip_plus_four_truncated() {
        let candidates = expand("123 main st springfield 12345-6789");
        assert_eq!(candidates[0], "123 main street springfield 12345");
        // literal candidate also carries the truncated code
        assert!(candidates.contains(&"123 main st springfield 12345".to_string()));
    }

    #[test]
    fn test_plain_zip_untouched() {
        assert_eq!(expand("12345")[0], "12345");
    }

    #[test]
    fn test_whole_tokens_only() {
        // "stone" must not be rewritten by the "st" rule
        assert_eq!(expand("12 stone way")[0], "12 stone way");
    }

    #[test]
    fn test_already_expanded_is_single_candidate() {
        assert_eq!(expand("123 main street"), vec!["123 main street"]);
    }

    #[test]
    fn test_non_english_passthrough() {
        let candidates = EnglishExpander::new()
            .expand("123 main st", &["fr"])
            .unwrap();
        assert_eq!(candidates, vec!["123 main st"]);
    }

    #[test]
    fn test_candidate_cap() {
        // four ambiguous "st" tokens would fan out to 16; capped at 8 (+literal)
        let candidates = expand("st st st st");
        assert!(candidates.len() <= super::MAX_CANDIDATES + 1);
    }
}

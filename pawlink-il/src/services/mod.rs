//! Service modules for the record-normalization and identity-linking engine
//!
//! Data flows one direction: raw source records → match-key derivation
//! (normalizer → symbol filter → address canonicalizer → key builder) →
//! identity linker → updated master table.

pub mod address;
pub mod expansion;
pub mod key_builder;
pub mod linker;
pub mod normalizer;

pub use address::canonicalize_address;
pub use expansion::{AddressExpander, EnglishExpander};
pub use key_builder::KeyBuilder;
pub use linker::{IdentityLinker, LinkOutcome};
pub use normalizer::{filter_symbols, normalize, normalize_opt, DEFAULT_ALLOWED};

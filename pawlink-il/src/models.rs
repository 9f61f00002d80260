//! Data model for the identity-linking engine
//!
//! SourceRecords are immutable once read; the master table is the single
//! explicitly-owned mutable structure, updated only through the Identity
//! Linker. MasterIdentity rows accumulate monotonically: created when no
//! match is found, unioned when a later record links, never destroyed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One row of one source dataset: an ordered mapping from normalized
/// column name to raw text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Source-local row id (input row order, 0-based after the header)
    pub row_id: u64,
    /// Ordered (column, raw value) pairs; columns are normalized at the
    /// ingestion boundary and unique per source
    pub fields: Vec<(String, String)>,
}

impl SourceRecord {
    pub fn new(row_id: u64, fields: Vec<(String, String)>) -> Self {
        Self { row_id, fields }
    }

    /// Raw value of a column, or None if the schema lacks it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    /// Column names in input order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// The comparable match keys derived from one SourceRecord.
///
/// Total by construction: absent source fields yield an empty string, and
/// `address_variants` always holds at least one element (possibly `""`),
/// so comparison never special-cases missing data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchKeySet {
    pub name: String,
    pub email: String,
    pub cell: String,
    pub phone: String,
    /// Ordered standardized candidate forms of the postal address
    pub address_variants: Vec<String>,
}

/// A source record linked to a master identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source_name: String,
    pub source_row_id: u64,
}

/// One master-table row: the union of match keys observed for one
/// real-world person, plus a back-reference to every linked record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterIdentity {
    pub identity_id: Uuid,
    pub keys: MatchKeySet,
    pub links: Vec<Link>,
}

impl MasterIdentity {
    /// Seed a new identity from one record's match keys
    pub fn new(keys: MatchKeySet) -> Self {
        Self {
            identity_id: Uuid::new_v4(),
            keys,
            links: Vec::new(),
        }
    }
}

/// The growing master identity table.
///
/// Invariant: each (source_name, source_row_id) pair maps to exactly one
/// identity_id, tracked in `linked`.
#[derive(Debug, Default)]
pub struct MasterTable {
    identities: Vec<MasterIdentity>,
    linked: HashMap<(String, u64), Uuid>,
}

impl MasterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identities(&self) -> &[MasterIdentity] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Identity a (source, row) pair is already linked to, if any
    pub fn linked_identity(&self, source_name: &str, source_row_id: u64) -> Option<Uuid> {
        self.linked
            .get(&(source_name.to_string(), source_row_id))
            .copied()
    }

    pub(crate) fn identities_mut(&mut self) -> &mut Vec<MasterIdentity> {
        &mut self.identities
    }

    pub(crate) fn record_link(&mut self, identity_id: Uuid, source_name: &str, source_row_id: u64) {
        self.linked
            .insert((source_name.to_string(), source_row_id), identity_id);
    }
}

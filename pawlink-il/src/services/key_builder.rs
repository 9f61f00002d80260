//! Match-key derivation
//!
//! Orchestrates normalization, symbol filtering, and address
//! canonicalization to derive the fixed set of match keys from one source
//! record, driven by the per-source field map. Output is always total:
//! every field populated, possibly with an empty string or a single-empty
//! address sequence, never partial.

use pawlink_common::{Error, FieldMap, Result};

use crate::models::{MatchKeySet, SourceRecord};
use crate::services::address::canonicalize_address;
use crate::services::expansion::AddressExpander;
use crate::services::normalizer::{filter_symbols, normalize, DEFAULT_ALLOWED};

/// Match-Key Builder for one configured source
pub struct KeyBuilder<'a> {
    field_map: &'a FieldMap,
    expander: &'a dyn AddressExpander,
}

impl<'a> KeyBuilder<'a> {
    pub fn new(field_map: &'a FieldMap, expander: &'a dyn AddressExpander) -> Self {
        Self { field_map, expander }
    }

    /// Check every column the field map references against a record's
    /// schema, so a source-schema mismatch fails before row 1 is linked.
    pub fn validate_field_map(&self, record: &SourceRecord) -> Result<()> {
        let mut missing: Vec<&str> = Vec::new();
        for column in self.referenced_columns() {
            if !record.has_column(column) {
                missing.push(column);
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidFieldMap(format!(
                "columns not in source schema: {}",
                missing.join(", ")
            )))
        }
    }

    /// Derive the match keys for one record.
    ///
    /// Name, cell, and phone are normalized and symbol-filtered; email is
    /// normalized only (its meaningful characters survive); the address
    /// column list goes through canonicalization and expansion.
    pub fn build_match_keys(&self, record: &SourceRecord) -> Result<MatchKeySet> {
        self.validate_field_map(record)?;

        let name_raw = self
            .field_map
            .name_columns
            .iter()
            .map(|c| record.get(c).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");
        let name = filter_symbols(&normalize(&name_raw), DEFAULT_ALLOWED);

        let email = normalize(self.value_of(record, self.field_map.email_column.as_deref()));
        let cell = filter_symbols(
            &normalize(self.value_of(record, self.field_map.cell_column.as_deref())),
            DEFAULT_ALLOWED,
        );
        let phone = filter_symbols(
            &normalize(self.value_of(record, self.field_map.phone_column.as_deref())),
            DEFAULT_ALLOWED,
        );

        let components: Vec<&str> = self
            .field_map
            .address_columns
            .iter()
            .map(|c| record.get(c).unwrap_or_default())
            .collect();
        let address_variants = canonicalize_address(&components, self.expander);

        Ok(MatchKeySet {
            name,
            email,
            cell,
            phone,
            address_variants,
        })
    }

    fn value_of<'r>(&self, record: &'r SourceRecord, column: Option<&str>) -> &'r str {
        column.and_then(|c| record.get(c)).unwrap_or_default()
    }

    fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.field_map
            .name_columns
            .iter()
            .map(String::as_str)
            .chain(self.field_map.email_column.as_deref())
            .chain(self.field_map.cell_column.as_deref())
            .chain(self.field_map.phone_column.as_deref())
            .chain(self.field_map.address_columns.iter().map(String::as_str))
    }
}

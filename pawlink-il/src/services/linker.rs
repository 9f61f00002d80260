//! Identity linking
//!
//! Reconciles one record's match keys against the growing master identity
//! table: exact-match rules in strict priority order, first hit wins. No
//! fuzzy or scored similarity. Name alone never merges (too many
//! collisions) and address alone never merges (multiple residents per
//! address), so the weakest rule requires both.

use uuid::Uuid;

use crate::models::{Link, MasterIdentity, MasterTable, MatchKeySet};

/// Result of linking one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Record matched an existing identity (or was already linked)
    Matched(Uuid),
    /// No rule matched; a new identity was created
    Created(Uuid),
}

impl LinkOutcome {
    pub fn identity_id(&self) -> Uuid {
        match self {
            LinkOutcome::Matched(id) | LinkOutcome::Created(id) => *id,
        }
    }
}

/// Identity Linker
#[derive(Debug, Default)]
pub struct IdentityLinker;

impl IdentityLinker {
    pub fn new() -> Self {
        Self
    }

    /// Link one record's match keys into the master table.
    ///
    /// **Matching rules (priority order, first hit wins):**
    /// 1. email non-empty and equal to an identity's email
    /// 2. cell non-empty and equal to an identity's cell or phone
    /// 3. phone non-empty and equal to an identity's cell or phone
    /// 4. name non-empty and equal to an identity's name, AND a non-empty
    ///    address variant shared with that identity
    ///
    /// On a match the identity's empty fields are filled from the record
    /// (existing non-empty values are never overwritten) and unseen address
    /// variants are appended. A new identity is seeded otherwise. The link
    /// is recorded in all cases; a (source, row) pair already in the table
    /// returns its existing identity untouched.
    pub fn link(
        &self,
        keys: MatchKeySet,
        source_name: &str,
        source_row_id: u64,
        master: &mut MasterTable,
    ) -> LinkOutcome {
        if let Some(existing) = master.linked_identity(source_name, source_row_id) {
            tracing::debug!(
                source = %source_name,
                row = source_row_id,
                identity = %existing,
                "Record already linked"
            );
            return LinkOutcome::Matched(existing);
        }

        match self.find_match(&keys, master) {
            Some(index) => {
                let identity = &mut master.identities_mut()[index];
                union_keys(&mut identity.keys, &keys);
                identity.links.push(Link {
                    source_name: source_name.to_string(),
                    source_row_id,
                });
                let identity_id = identity.identity_id;
                master.record_link(identity_id, source_name, source_row_id);
                tracing::debug!(
                    source = %source_name,
                    row = source_row_id,
                    identity = %identity_id,
                    "Linked to existing identity"
                );
                LinkOutcome::Matched(identity_id)
            }
            None => {
                let mut identity = MasterIdentity::new(keys);
                identity.links.push(Link {
                    source_name: source_name.to_string(),
                    source_row_id,
                });
                let identity_id = identity.identity_id;
                master.identities_mut().push(identity);
                master.record_link(identity_id, source_name, source_row_id);
                tracing::debug!(
                    source = %source_name,
                    row = source_row_id,
                    identity = %identity_id,
                    "Created new identity"
                );
                LinkOutcome::Created(identity_id)
            }
        }
    }

    /// Index of the first identity matching any rule, rules tried in
    /// priority order across the whole table.
    fn find_match(&self, keys: &MatchKeySet, master: &MasterTable) -> Option<usize> {
        let identities = master.identities();

        if !keys.email.is_empty() {
            if let Some(i) = identities.iter().position(|id| id.keys.email == keys.email) {
                return Some(i);
            }
        }
        if !keys.cell.is_empty() {
            if let Some(i) = identities
                .iter()
                .position(|id| id.keys.cell == keys.cell || id.keys.phone == keys.cell)
            {
                return Some(i);
            }
        }
        if !keys.phone.is_empty() {
            if let Some(i) = identities
                .iter()
                .position(|id| id.keys.cell == keys.phone || id.keys.phone == keys.phone)
            {
                return Some(i);
            }
        }
        if !keys.name.is_empty() {
            if let Some(i) = identities.iter().position(|id| {
                id.keys.name == keys.name && variants_intersect(&id.keys.address_variants, &keys.address_variants)
            }) {
                return Some(i);
            }
        }
        None
    }
}

/// Set intersection over address variants; empty strings never count as an
/// intersecting candidate.
fn variants_intersect(a: &[String], b: &[String]) -> bool {
    b.iter()
        .filter(|v| !v.is_empty())
        .any(|v| a.contains(v))
}

/// Union a record's non-empty keys into an identity's keys.
///
/// Merge strategy: only empty fields are filled, existing non-empty values
/// are never overwritten, and address variants only grow.
fn union_keys(existing: &mut MatchKeySet, new: &MatchKeySet) {
    if existing.name.is_empty() && !new.name.is_empty() {
        existing.name = new.name.clone();
    }
    if existing.email.is_empty() && !new.email.is_empty() {
        existing.email = new.email.clone();
    }
    if existing.cell.is_empty() && !new.cell.is_empty() {
        existing.cell = new.cell.clone();
    }
    if existing.phone.is_empty() && !new.phone.is_empty() {
        existing.phone = new.phone.clone();
    }
    for variant in &new.address_variants {
        if !variant.is_empty() && !existing.address_variants.contains(variant) {
            existing.address_variants.push(variant.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(name: &str, email: &str, cell: &str, phone: &str, variants: &[&str]) -> MatchKeySet {
        let address_variants = if variants.is_empty() {
            vec![String::new()]
        } else {
            variants.iter().map(|v| v.to_string()).collect()
        };
        MatchKeySet {
            name: name.to_string(),
            email: email.to_string(),
            cell: cell.to_string(),
            phone: phone.to_string(),
            address_variants,
        }
    }

    #[test]
    fn test_email_match() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        let first = linker.link(keys("doe jane", "jane.doe@x.com", "", "", &[]), "crm", 0, &mut master);
        let second = linker.link(keys("", "jane.doe@x.com", "", "", &[]), "petpoint", 7, &mut master);

        assert!(matches!(first, LinkOutcome::Created(_)));
        assert_eq!(second, LinkOutcome::Matched(first.identity_id()));
        assert_eq!(master.len(), 1);
    }

    #[test]
    fn test_cell_matches_phone_field() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        let first = linker.link(keys("doe jane", "", "", "555 123-4567", &[]), "crm", 0, &mut master);
        // cell on the new record against phone on the identity
        let second = linker.link(keys("", "", "555 123-4567", "", &[]), "vol", 1, &mut master);

        assert_eq!(second.identity_id(), first.identity_id());
        assert_eq!(master.len(), 1);
    }

    #[test]
    fn test_name_and_address_match() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        let first = linker.link(
            keys("doe jane", "", "", "", &["123 main street"]),
            "crm",
            0,
            &mut master,
        );
        let second = linker.link(
            keys("doe jane", "", "", "", &["123 main street", "123 main st"]),
            "petpoint",
            1,
            &mut master,
        );

        assert_eq!(second.identity_id(), first.identity_id());
    }

    #[test]
    fn test_name_alone_never_merges() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        linker.link(keys("doe jane", "", "", "", &["123 main street"]), "crm", 0, &mut master);
        let second = linker.link(
            keys("doe jane", "", "", "", &["9 other road"]),
            "petpoint",
            1,
            &mut master,
        );

        assert!(matches!(second, LinkOutcome::Created(_)));
        assert_eq!(master.len(), 2);
    }

    #[test]
    fn test_address_alone_never_merges() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        linker.link(keys("doe jane", "", "", "", &["123 main street"]), "crm", 0, &mut master);
        let second = linker.link(
            keys("smith bob", "", "", "", &["123 main street"]),
            "petpoint",
            1,
            &mut master,
        );

        assert!(matches!(second, LinkOutcome::Created(_)));
        assert_eq!(master.len(), 2);
    }

    #[test]
    fn test_empty_variants_never_intersect() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        linker.link(keys("doe jane", "", "", "", &[]), "crm", 0, &mut master);
        let second = linker.link(keys("doe jane", "", "", "", &[]), "petpoint", 1, &mut master);

        assert!(matches!(second, LinkOutcome::Created(_)));
        assert_eq!(master.len(), 2);
    }

    #[test]
    fn test_union_fills_empty_only() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        linker.link(
            keys("doe jane", "jane.doe@x.com", "", "555 111-2222", &["123 main street"]),
            "crm",
            0,
            &mut master,
        );
        linker.link(
            keys("jane doe", "jane.doe@x.com", "555 333-4444", "555 999-0000", &["45 oak avenue"]),
            "vol",
            3,
            &mut master,
        );

        let identity = &master.identities()[0];
        // existing non-empty fields never overwritten
        assert_eq!(identity.keys.name, "doe jane");
        assert_eq!(identity.keys.phone, "555 111-2222");
        // empty field filled
        assert_eq!(identity.keys.cell, "555 333-4444");
        // variants extended, not replaced
        assert_eq!(
            identity.keys.address_variants,
            vec!["123 main street".to_string(), "45 oak avenue".to_string()]
        );
    }

    #[test]
    fn test_link_uniqueness_per_source_row() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        let first = linker.link(keys("doe jane", "jane.doe@x.com", "", "", &[]), "crm", 0, &mut master);
        let again = linker.link(keys("doe jane", "jane.doe@x.com", "", "", &[]), "crm", 0, &mut master);

        assert_eq!(again, LinkOutcome::Matched(first.identity_id()));
        assert_eq!(master.identities()[0].links.len(), 1);
    }

    #[test]
    fn test_priority_email_over_phone() {
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        let by_email = linker.link(keys("a", "shared@x.com", "", "", &[]), "crm", 0, &mut master);
        let by_phone = linker.link(keys("b", "", "", "555 000-1111", &[]), "crm", 1, &mut master);
        // carries the first identity's email and the second's phone: rule 1 wins
        let third = linker.link(
            keys("c", "shared@x.com", "", "555 000-1111", &[]),
            "vol",
            0,
            &mut master,
        );

        assert_eq!(third.identity_id(), by_email.identity_id());
        assert_ne!(third.identity_id(), by_phone.identity_id());
    }
}

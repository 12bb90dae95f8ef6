//! RocksDB column family definitions.

/// Entity records: identifier → IdentityRecord
pub const CF_ENTITY_RECORDS: &str = "entity_records";

/// Channel claims: channel_name → identifier
///
/// Claims are never deleted, so a name is handed out at most once.
pub const CF_CHANNEL_CLAIMS: &str = "channel_claims";

/// Records by registrar index: (registrar, identifier) → identifier
pub const CF_RECORDS_BY_REGISTRAR: &str = "records_by_registrar";

/// Saga reports of partially failed registrations: registration_id → ReconciliationReport
pub const CF_REGISTRATION_JOURNAL: &str = "registration_journal";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        CF_ENTITY_RECORDS,
        CF_CHANNEL_CLAIMS,
        CF_RECORDS_BY_REGISTRAR,
        CF_REGISTRATION_JOURNAL,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_column_families() {
        let cfs = all_column_families();
        let mut unique = std::collections::HashSet::new();

        for cf in &cfs {
            assert!(unique.insert(cf), "Duplicate column family: {}", cf);
        }
    }
}

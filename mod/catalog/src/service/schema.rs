use svcreg_sql::SQLStore;

use crate::service::CatalogError;

/// Initialize the SQLite schema for all catalog resources.
///
/// The `UNIQUE (organization, identifier)` constraints are load-bearing:
/// they backstop the counter-based identifier allocator under concurrent
/// creation (a collision maps to Conflict and the allocator retries).
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), CatalogError> {
    let statements = [
        // Organizations: tenant roots, keyed by code
        "CREATE TABLE IF NOT EXISTS organizations (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",

        // Life situations: top-level catalog nodes
        "CREATE TABLE IF NOT EXISTS life_situations (
            id TEXT PRIMARY KEY,
            organization TEXT NOT NULL,
            name TEXT NOT NULL,
            identifier TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (organization, identifier)
        )",
        "CREATE INDEX IF NOT EXISTS idx_life_situations_org ON life_situations(organization)",

        // Services: children of life situations
        "CREATE TABLE IF NOT EXISTS services (
            id TEXT PRIMARY KEY,
            organization TEXT NOT NULL,
            life_situation TEXT NOT NULL,
            name TEXT NOT NULL,
            identifier TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (organization, identifier)
        )",
        "CREATE INDEX IF NOT EXISTS idx_services_org ON services(organization)",
        "CREATE INDEX IF NOT EXISTS idx_services_parent ON services(life_situation)",

        // Processes: children of services; the ProcessData sub-record
        // lives inside `data`, so a process and its data commit as one row
        "CREATE TABLE IF NOT EXISTS processes (
            id TEXT PRIMARY KEY,
            organization TEXT NOT NULL,
            service TEXT NOT NULL,
            name TEXT NOT NULL,
            status TEXT NOT NULL,
            identifier TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (organization, identifier)
        )",
        "CREATE INDEX IF NOT EXISTS idx_processes_org ON processes(organization)",
        "CREATE INDEX IF NOT EXISTS idx_processes_parent ON processes(service)",

        // Per-scope ordinal counters; never decremented, so deleted
        // ordinals are not reused
        "CREATE TABLE IF NOT EXISTS counters (
            scope TEXT PRIMARY KEY,
            last_ordinal INTEGER NOT NULL
        )",
    ];

    for stmt in statements {
        sql.exec(stmt, &[])
            .map_err(|e| CatalogError::Storage(format!("schema init: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use svcreg_sql::sqlite::SqliteStore;

    use super::*;

    #[test]
    fn init_schema_is_idempotent() {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql).unwrap();
        init_schema(&sql).unwrap();
    }

    #[test]
    fn identifier_unique_per_organization() {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql).unwrap();

        let insert = "INSERT INTO life_situations \
                      (id, organization, name, identifier, data, created_at, updated_at) \
                      VALUES (?1, ?2, 'HEALTH', ?3, '{}', 't', 't')";
        sql.exec(insert, &["a".into(), "MIN".into(), "MIN.1".into()]).unwrap();

        // Same identifier in the same organization is rejected.
        let err = sql
            .exec(insert, &["b".into(), "MIN".into(), "MIN.1".into()])
            .unwrap_err();
        assert!(err.is_unique_violation());

        // A different organization may use the same ordinal.
        sql.exec(insert, &["c".into(), "CITY".into(), "MIN.1".into()]).unwrap();
    }
}

pub mod identifier;
pub mod life_situation;
pub mod organization;
pub mod process;
pub mod schema;
pub mod service;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use svcreg_sql::{SQLStore, Value};

/// Catalog service error type.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<CatalogError> for svcreg_core::ServiceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(m) => svcreg_core::ServiceError::NotFound(m),
            CatalogError::Conflict(m) => svcreg_core::ServiceError::Conflict(m),
            CatalogError::Validation(m) => svcreg_core::ServiceError::Validation(m),
            CatalogError::Unauthorized(m) => svcreg_core::ServiceError::Unauthorized(m),
            CatalogError::Storage(m) => svcreg_core::ServiceError::Storage(m),
            CatalogError::Internal(m) => svcreg_core::ServiceError::Internal(m),
        }
    }
}

/// The catalog service. Holds the storage backend.
pub struct CatalogService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl CatalogService {
    /// Create a new CatalogService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, CatalogError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql }))
    }

    // ── Generic record helpers ──────────────────────────────────────
    //
    // Every entity row stores the full record as JSON in `data`, plus a
    // handful of indexed columns for filtering and constraints.

    /// Insert a record as JSON into a table with indexed columns.
    ///
    /// A UNIQUE violation maps to [`CatalogError::Conflict`] so callers
    /// can retry (identifier allocation relies on this).
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), CatalogError> {
        let json = serde_json::to_string(record)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            cols.push(*col);
            placeholders.push(format!("?{}", i + 3));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            if e.is_unique_violation() {
                CatalogError::Conflict(e.to_string())
            } else {
                CatalogError::Storage(e.to_string())
            }
        })?;

        Ok(())
    }

    /// Get a record by id within the caller's organization.
    pub(crate) fn get_scoped<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        organization: &str,
    ) -> Result<T, CatalogError> {
        let sql = format!(
            "SELECT data FROM {} WHERE id = ?1 AND organization = ?2",
            table
        );
        let rows = self
            .sql
            .query(
                &sql,
                &[Value::Text(id.to_string()), Value::Text(organization.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| CatalogError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| CatalogError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| CatalogError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), CatalogError> {
        let json = serde_json::to_string(record)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            sets.push(format!("{} = ?{}", col, i + 2));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(CatalogError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// Delete a record by id within the caller's organization.
    pub(crate) fn delete_scoped(
        &self,
        table: &str,
        id: &str,
        organization: &str,
    ) -> Result<(), CatalogError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1 AND organization = ?2", table);
        let affected = self
            .sql
            .exec(
                &sql,
                &[Value::Text(id.to_string()), Value::Text(organization.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(CatalogError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// Run a `SELECT data ...` query and deserialize each row.
    pub(crate) fn query_records<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, CatalogError> {
        let rows = self
            .sql
            .query(sql, params)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| CatalogError::Internal("missing data column".into()))?;
            items.push(
                serde_json::from_str(data).map_err(|e| CatalogError::Internal(e.to_string()))?,
            );
        }
        Ok(items)
    }

    /// Run a `SELECT COUNT(*) as cnt ...` query.
    pub(crate) fn count_records(&self, sql: &str, params: &[Value]) -> Result<usize, CatalogError> {
        let rows = self
            .sql
            .query(sql, params)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use svcreg_core::Caller;
    use svcreg_sql::sqlite::SqliteStore;

    use super::CatalogService;

    /// A fresh service over in-memory SQLite with one bootstrapped
    /// organization, plus a caller belonging to it.
    pub fn service_with_org(code: &str) -> (Arc<CatalogService>, Caller) {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let svc = CatalogService::new(sql).unwrap();
        svc.ensure_organization(code, &format!("{} org", code)).unwrap();
        (svc, Caller::new("u-test", code))
    }
}

use svcreg_core::now_rfc3339;
use svcreg_sql::Value;

use crate::model::Organization;
use crate::service::{CatalogError, CatalogService};

impl CatalogService {
    /// Create an organization if it does not exist yet; return it either
    /// way. Called from bootstrap — organizations are immutable after
    /// creation.
    pub fn ensure_organization(&self, code: &str, name: &str) -> Result<Organization, CatalogError> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CatalogError::Validation(format!(
                "organization code `{}` must be non-empty and alphanumeric",
                code
            )));
        }

        let org = Organization {
            code: code.to_string(),
            name: name.to_string(),
            created_at: now_rfc3339(),
        };
        let json = serde_json::to_string(&org)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT OR IGNORE INTO organizations (code, name, data, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(org.code.clone()),
                    Value::Text(org.name.clone()),
                    Value::Text(json),
                    Value::Text(org.created_at.clone()),
                ],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        self.get_organization(code)
    }

    /// Get an organization by code.
    pub fn get_organization(&self, code: &str) -> Result<Organization, CatalogError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM organizations WHERE code = ?1",
                &[Value::Text(code.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| CatalogError::NotFound(format!("organizations/{}", code)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| CatalogError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| CatalogError::Internal(e.to_string()))
    }
}

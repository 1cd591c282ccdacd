//! Hierarchical identifier allocation.
//!
//! Every entity carries an organization-scoped identifier of the form
//! `{parent_identifier}.{k}` (`{org_code}.{k}` at the top level), where
//! `k` is a 1-based ordinal within the parent scope.
//!
//! Ordinals come from a per-scope counter row that is bumped with a
//! single atomic upsert, so concurrent creations under the same parent
//! always observe distinct values. The counter is never decremented:
//! deleting a child leaves a gap instead of recycling its ordinal. A
//! `UNIQUE (organization, identifier)` constraint backstops the counter;
//! on a collision the caller retries with a fresh ordinal, bounded by
//! [`MAX_ALLOCATION_ATTEMPTS`].

use svcreg_core::Caller;
use svcreg_sql::Value;

use crate::service::{CatalogError, CatalogService};

/// Upper bound on insert attempts before a collision surfaces as an
/// internal error. Collisions are not surfaced as Conflict to callers.
pub(crate) const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Counter scope for LifeSituations of an organization.
pub(crate) fn life_situation_scope(organization: &str) -> String {
    format!("ls:{}", organization)
}

/// Counter scope for Services of a LifeSituation.
pub(crate) fn service_scope(life_situation_id: &str) -> String {
    format!("svc:{}", life_situation_id)
}

/// Counter scope for Processes of a Service.
pub(crate) fn process_scope(service_id: &str) -> String {
    format!("proc:{}", service_id)
}

impl CatalogService {
    /// Atomically take the next ordinal for a scope.
    ///
    /// Not idempotent: every call hands out a new number, so this must
    /// run exactly once per durable creation.
    pub(crate) fn next_ordinal(&self, scope: &str) -> Result<i64, CatalogError> {
        let rows = self
            .sql
            .query(
                "INSERT INTO counters (scope, last_ordinal) VALUES (?1, 1) \
                 ON CONFLICT(scope) DO UPDATE SET last_ordinal = last_ordinal + 1 \
                 RETURNING last_ordinal",
                &[Value::Text(scope.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        rows.first()
            .and_then(|r| r.get_i64("last_ordinal"))
            .ok_or_else(|| CatalogError::Internal(format!("counter upsert returned no row for {}", scope)))
    }

    /// Read the ordinal the next allocation would get, without taking it.
    ///
    /// Best-effort by design: a creation racing with the preview may
    /// consume the previewed ordinal first.
    pub(crate) fn peek_ordinal(&self, scope: &str) -> Result<i64, CatalogError> {
        let rows = self
            .sql
            .query(
                "SELECT last_ordinal FROM counters WHERE scope = ?1",
                &[Value::Text(scope.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("last_ordinal")).unwrap_or(0) + 1)
    }

    // ── Identifier previews ─────────────────────────────────────────

    /// Preview the identifier the next LifeSituation in the caller's
    /// organization would get.
    pub fn preview_life_situation_identifier(&self, caller: &Caller) -> Result<String, CatalogError> {
        let org = self.get_organization(&caller.organization).map_err(|_| {
            CatalogError::Unauthorized(format!(
                "caller organization `{}` is not registered",
                caller.organization
            ))
        })?;
        let ordinal = self.peek_ordinal(&life_situation_scope(&org.code))?;
        Ok(format!("{}.{}", org.code, ordinal))
    }

    /// Preview the identifier the next Service under `life_situation_id`
    /// would get.
    pub fn preview_service_identifier(
        &self,
        caller: &Caller,
        life_situation_id: &str,
    ) -> Result<String, CatalogError> {
        let parent = self.get_life_situation(caller, life_situation_id)?;
        let ordinal = self.peek_ordinal(&service_scope(&parent.id))?;
        Ok(format!("{}.{}", parent.identifier, ordinal))
    }

    /// Preview the identifier the next Process under `service_id` would
    /// get.
    pub fn preview_process_identifier(
        &self,
        caller: &Caller,
        service_id: &str,
    ) -> Result<String, CatalogError> {
        let parent = self.get_service(caller, service_id)?;
        let ordinal = self.peek_ordinal(&process_scope(&parent.id))?;
        Ok(format!("{}.{}", parent.identifier, ordinal))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::service::test_support::service_with_org;
    use crate::service::CatalogError;

    #[test]
    fn ordinals_are_sequential_per_scope() {
        let (svc, _) = service_with_org("MIN");
        assert_eq!(svc.next_ordinal("ls:MIN").unwrap(), 1);
        assert_eq!(svc.next_ordinal("ls:MIN").unwrap(), 2);
        assert_eq!(svc.next_ordinal("ls:CITY").unwrap(), 1);
        assert_eq!(svc.next_ordinal("ls:MIN").unwrap(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let (svc, _) = service_with_org("MIN");
        assert_eq!(svc.peek_ordinal("ls:MIN").unwrap(), 1);
        assert_eq!(svc.peek_ordinal("ls:MIN").unwrap(), 1);
        assert_eq!(svc.next_ordinal("ls:MIN").unwrap(), 1);
        assert_eq!(svc.peek_ordinal("ls:MIN").unwrap(), 2);
    }

    #[test]
    fn preview_matches_next_create() {
        let (svc, caller) = service_with_org("MIN");

        assert_eq!(svc.preview_life_situation_identifier(&caller).unwrap(), "MIN.1");
        let ls = svc
            .create_life_situation(&caller, &json!({"name": "HEALTH"}))
            .unwrap();
        assert_eq!(ls.identifier, "MIN.1");

        // Three services, then the preview announces ordinal 4 — and the
        // next real create still gets it.
        for _ in 0..3 {
            svc.create_service(
                &caller,
                &json!({"service_type": "PUBLIC", "name": "svc", "life_situation": ls.id}),
            )
            .unwrap();
        }
        let preview = svc.preview_service_identifier(&caller, &ls.id).unwrap();
        assert_eq!(preview, "MIN.1.4");
        let created = svc
            .create_service(
                &caller,
                &json!({"service_type": "PUBLIC", "name": "svc", "life_situation": ls.id}),
            )
            .unwrap();
        assert_eq!(created.identifier, "MIN.1.4");
    }

    #[test]
    fn preview_for_missing_parent_is_not_found() {
        let (svc, caller) = service_with_org("MIN");
        let err = svc.preview_service_identifier(&caller, "missing").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        let err = svc.preview_process_identifier(&caller, "missing").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn preview_for_unregistered_organization_is_unauthorized() {
        let (svc, _) = service_with_org("MIN");
        let stranger = svcreg_core::Caller::new("u-x", "GHOST");
        let err = svc.preview_life_situation_identifier(&stranger).unwrap_err();
        assert!(matches!(err, CatalogError::Unauthorized(_)));
    }
}

use serde_json::Value as Json;

use svcreg_core::{merge_patch, new_id, now_rfc3339, Caller, ListParams, ListResult};
use svcreg_sql::Value;

use crate::model::{CreateLifeSituation, LifeSituation};
use crate::projection::{projection_for, render::render, validate::validate, EntityKind, Operation};
use crate::service::identifier::{life_situation_scope, MAX_ALLOCATION_ATTEMPTS};
use crate::service::{CatalogError, CatalogService};

impl CatalogService {
    /// Create a new LifeSituation in the caller's organization.
    ///
    /// The payload is shaped by the `create` projection; any client
    /// supplied identifier is discarded and a fresh one allocated.
    pub fn create_life_situation(
        &self,
        caller: &Caller,
        payload: &Json,
    ) -> Result<LifeSituation, CatalogError> {
        let projection = projection_for(EntityKind::LifeSituation, Operation::Create);
        let sanitized = validate(projection, payload, true).map_err(CatalogError::Validation)?;
        let input: CreateLifeSituation = serde_json::from_value(Json::Object(sanitized))
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        let org = self.get_organization(&caller.organization).map_err(|_| {
            CatalogError::Unauthorized(format!(
                "caller organization `{}` is not registered",
                caller.organization
            ))
        })?;

        let scope = life_situation_scope(&org.code);
        let mut last_conflict = String::new();
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let ordinal = self.next_ordinal(&scope)?;
            let now = now_rfc3339();
            let ls = LifeSituation {
                id: new_id(),
                name: input.name,
                identifier: format!("{}.{}", org.code, ordinal),
                organization: org.code.clone(),
                owner: caller.user_id.clone(),
                created_at: now.clone(),
                updated_at: now,
            };

            let indexes: Vec<(&str, Value)> = vec![
                ("organization", Value::from(ls.organization.clone())),
                ("name", Value::from(ls.name.as_str())),
                ("identifier", Value::from(ls.identifier.clone())),
                ("created_at", Value::from(ls.created_at.clone())),
                ("updated_at", Value::from(ls.updated_at.clone())),
            ];

            match self.insert_record("life_situations", &ls.id, &ls, &indexes) {
                Ok(()) => {
                    tracing::info!(identifier = %ls.identifier, "life situation created");
                    return Ok(ls);
                }
                Err(CatalogError::Conflict(m)) => {
                    tracing::warn!(
                        attempt,
                        identifier = %ls.identifier,
                        "identifier collision, retrying allocation"
                    );
                    last_conflict = m;
                }
                Err(e) => return Err(e),
            }
        }

        Err(CatalogError::Internal(format!(
            "identifier allocation exhausted after {} attempts: {}",
            MAX_ALLOCATION_ATTEMPTS, last_conflict
        )))
    }

    /// Get a LifeSituation by id, scoped to the caller's organization.
    pub fn get_life_situation(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<LifeSituation, CatalogError> {
        self.get_scoped("life_situations", id, &caller.organization)
    }

    /// Retrieve a LifeSituation shaped by the `retrieve` projection.
    pub fn retrieve_life_situation(&self, caller: &Caller, id: &str) -> Result<Json, CatalogError> {
        let ls = self.get_life_situation(caller, id)?;
        let source = serde_json::to_value(&ls).map_err(|e| CatalogError::Internal(e.to_string()))?;
        let projection = projection_for(EntityKind::LifeSituation, Operation::Retrieve);
        Ok(render(projection, &source))
    }

    /// List LifeSituations shaped by the `list` projection, with their
    /// Services embedded.
    ///
    /// An optional search term matches (case-insensitively) the node's
    /// own name or any child Service name; a node matching through
    /// several services still appears once.
    pub fn list_life_situations(
        &self,
        caller: &Caller,
        params: &ListParams,
    ) -> Result<ListResult<Json>, CatalogError> {
        let mut where_sql = "organization = ?1".to_string();
        let mut query_params: Vec<Value> = vec![Value::from(caller.organization.clone())];

        if let Some(term) = params.search.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            where_sql.push_str(
                " AND (lower(name) LIKE ?2 OR id IN \
                 (SELECT life_situation FROM services \
                  WHERE organization = ?1 AND lower(name) LIKE ?2))",
            );
            query_params.push(Value::from(pattern));
        }

        let total = self.count_records(
            &format!("SELECT COUNT(*) as cnt FROM life_situations WHERE {}", where_sql),
            &query_params,
        )?;

        let limit_idx = query_params.len() + 1;
        let offset_idx = query_params.len() + 2;
        query_params.push(Value::Integer(params.limit as i64));
        query_params.push(Value::Integer(params.offset as i64));
        let situations: Vec<LifeSituation> = self.query_records(
            &format!(
                "SELECT data FROM life_situations WHERE {} \
                 ORDER BY created_at LIMIT ?{} OFFSET ?{}",
                where_sql, limit_idx, offset_idx
            ),
            &query_params,
        )?;

        let children = self.services_by_parent(caller, &situations)?;

        let projection = projection_for(EntityKind::LifeSituation, Operation::List);
        let mut items = Vec::with_capacity(situations.len());
        for ls in &situations {
            let mut source =
                serde_json::to_value(ls).map_err(|e| CatalogError::Internal(e.to_string()))?;
            source["services"] = Json::Array(
                children.get(ls.id.as_str()).cloned().unwrap_or_default(),
            );
            items.push(render(projection, &source));
        }

        Ok(ListResult { items, total })
    }

    /// Raw service JSON grouped by parent id, for list embedding.
    fn services_by_parent(
        &self,
        caller: &Caller,
        situations: &[LifeSituation],
    ) -> Result<std::collections::HashMap<String, Vec<Json>>, CatalogError> {
        let mut grouped: std::collections::HashMap<String, Vec<Json>> = Default::default();
        if situations.is_empty() {
            return Ok(grouped);
        }

        let mut sql = "SELECT data FROM services WHERE organization = ?1 \
                       AND life_situation IN ("
            .to_string();
        let mut query_params: Vec<Value> = vec![Value::from(caller.organization.clone())];
        for (i, ls) in situations.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(&format!("?{}", i + 2));
            query_params.push(Value::from(ls.id.clone()));
        }
        sql.push_str(") ORDER BY created_at");

        let services: Vec<crate::model::Service> = self.query_records(&sql, &query_params)?;
        for svc in services {
            let parent = svc.life_situation.clone();
            let json =
                serde_json::to_value(&svc).map_err(|e| CatalogError::Internal(e.to_string()))?;
            grouped.entry(parent).or_default().push(json);
        }
        Ok(grouped)
    }

    /// Update a LifeSituation. Only `name` is writable; identifier and
    /// organization are immutable.
    pub fn update_life_situation(
        &self,
        caller: &Caller,
        id: &str,
        payload: &Json,
    ) -> Result<LifeSituation, CatalogError> {
        let projection = projection_for(EntityKind::LifeSituation, Operation::Update);
        let sanitized = validate(projection, payload, false).map_err(CatalogError::Validation)?;

        let current = self.get_life_situation(caller, id)?;
        let now = now_rfc3339();

        let mut base =
            serde_json::to_value(&current).map_err(|e| CatalogError::Internal(e.to_string()))?;
        merge_patch(&mut base, &Json::Object(sanitized));
        base["id"] = Json::String(current.id.clone());
        base["identifier"] = Json::String(current.identifier.clone());
        base["organization"] = Json::String(current.organization.clone());
        base["owner"] = Json::String(current.owner.clone());
        base["created_at"] = Json::String(current.created_at.clone());
        base["updated_at"] = Json::String(now.clone());

        let updated: LifeSituation =
            serde_json::from_value(base).map_err(|e| CatalogError::Internal(e.to_string()))?;

        let indexes: Vec<(&str, Value)> = vec![
            ("name", Value::from(updated.name.as_str())),
            ("updated_at", Value::from(now)),
        ];
        self.update_record("life_situations", id, &updated, &indexes)?;
        Ok(updated)
    }

    /// Delete a LifeSituation together with its Services and their
    /// Processes.
    pub fn delete_life_situation(&self, caller: &Caller, id: &str) -> Result<(), CatalogError> {
        // Existence (and organization) check first.
        let ls = self.get_life_situation(caller, id)?;

        self.sql
            .exec(
                "DELETE FROM processes WHERE organization = ?1 AND service IN \
                 (SELECT id FROM services WHERE life_situation = ?2)",
                &[Value::from(caller.organization.clone()), Value::from(id)],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        self.sql
            .exec(
                "DELETE FROM services WHERE organization = ?1 AND life_situation = ?2",
                &[Value::from(caller.organization.clone()), Value::from(id)],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        self.delete_scoped("life_situations", id, &caller.organization)?;
        tracing::info!(identifier = %ls.identifier, "life situation deleted");
        Ok(())
    }
}

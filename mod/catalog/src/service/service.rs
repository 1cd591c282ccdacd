use serde_json::Value as Json;

use svcreg_core::{merge_patch, new_id, now_rfc3339, Caller, ListParams, ListResult};
use svcreg_sql::Value;

use crate::model::{CreateService, Service};
use crate::projection::{projection_for, render::render, validate::validate, EntityKind, Operation};
use crate::service::identifier::{service_scope, MAX_ALLOCATION_ATTEMPTS};
use crate::service::{CatalogError, CatalogService};

impl CatalogService {
    /// Create a new Service under a LifeSituation of the caller's
    /// organization.
    pub fn create_service(&self, caller: &Caller, payload: &Json) -> Result<Service, CatalogError> {
        let projection = projection_for(EntityKind::Service, Operation::Create);
        let sanitized = validate(projection, payload, true).map_err(CatalogError::Validation)?;
        let input: CreateService = serde_json::from_value(Json::Object(sanitized))
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        let parent = self.get_life_situation(caller, &input.life_situation)?;

        let scope = service_scope(&parent.id);
        let mut last_conflict = String::new();
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let ordinal = self.next_ordinal(&scope)?;
            let now = now_rfc3339();
            let service = Service {
                id: new_id(),
                service_type: input.service_type,
                name: input.name.clone(),
                regulating_act: input.regulating_act.clone(),
                identifier: format!("{}.{}", parent.identifier, ordinal),
                life_situation: parent.id.clone(),
                organization: parent.organization.clone(),
                owner: caller.user_id.clone(),
                created_at: now.clone(),
                updated_at: now,
            };

            let indexes: Vec<(&str, Value)> = vec![
                ("organization", Value::from(service.organization.clone())),
                ("life_situation", Value::from(service.life_situation.clone())),
                ("name", Value::from(service.name.clone())),
                ("identifier", Value::from(service.identifier.clone())),
                ("created_at", Value::from(service.created_at.clone())),
                ("updated_at", Value::from(service.updated_at.clone())),
            ];

            match self.insert_record("services", &service.id, &service, &indexes) {
                Ok(()) => {
                    tracing::info!(identifier = %service.identifier, "service created");
                    return Ok(service);
                }
                Err(CatalogError::Conflict(m)) => {
                    tracing::warn!(
                        attempt,
                        identifier = %service.identifier,
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

    /// Get a Service by id, scoped to the caller's organization.
    pub fn get_service(&self, caller: &Caller, id: &str) -> Result<Service, CatalogError> {
        self.get_scoped("services", id, &caller.organization)
    }

    /// Retrieve a Service shaped by the `retrieve` projection.
    pub fn retrieve_service(&self, caller: &Caller, id: &str) -> Result<Json, CatalogError> {
        let service = self.get_service(caller, id)?;
        let source =
            serde_json::to_value(&service).map_err(|e| CatalogError::Internal(e.to_string()))?;
        let projection = projection_for(EntityKind::Service, Operation::Retrieve);
        Ok(render(projection, &source))
    }

    /// List Services shaped by the `list` projection. An optional search
    /// term matches the service name case-insensitively.
    pub fn list_services(
        &self,
        caller: &Caller,
        params: &ListParams,
    ) -> Result<ListResult<Json>, CatalogError> {
        let mut where_sql = "organization = ?1".to_string();
        let mut query_params: Vec<Value> = vec![Value::from(caller.organization.clone())];

        if let Some(term) = params.search.as_deref().filter(|t| !t.is_empty()) {
            where_sql.push_str(" AND lower(name) LIKE ?2");
            query_params.push(Value::from(format!("%{}%", term.to_lowercase())));
        }

        let total = self.count_records(
            &format!("SELECT COUNT(*) as cnt FROM services WHERE {}", where_sql),
            &query_params,
        )?;

        let limit_idx = query_params.len() + 1;
        let offset_idx = query_params.len() + 2;
        query_params.push(Value::Integer(params.limit as i64));
        query_params.push(Value::Integer(params.offset as i64));
        let services: Vec<Service> = self.query_records(
            &format!(
                "SELECT data FROM services WHERE {} ORDER BY created_at LIMIT ?{} OFFSET ?{}",
                where_sql, limit_idx, offset_idx
            ),
            &query_params,
        )?;

        let projection = projection_for(EntityKind::Service, Operation::List);
        let mut items = Vec::with_capacity(services.len());
        for service in &services {
            let source = serde_json::to_value(service)
                .map_err(|e| CatalogError::Internal(e.to_string()))?;
            items.push(render(projection, &source));
        }

        Ok(ListResult { items, total })
    }

    /// Update a Service. The parent link and identifier are immutable.
    pub fn update_service(
        &self,
        caller: &Caller,
        id: &str,
        payload: &Json,
    ) -> Result<Service, CatalogError> {
        let projection = projection_for(EntityKind::Service, Operation::Update);
        let sanitized = validate(projection, payload, false).map_err(CatalogError::Validation)?;

        let current = self.get_service(caller, id)?;
        let now = now_rfc3339();

        let mut base =
            serde_json::to_value(&current).map_err(|e| CatalogError::Internal(e.to_string()))?;
        merge_patch(&mut base, &Json::Object(sanitized));
        base["id"] = Json::String(current.id.clone());
        base["identifier"] = Json::String(current.identifier.clone());
        base["life_situation"] = Json::String(current.life_situation.clone());
        base["organization"] = Json::String(current.organization.clone());
        base["owner"] = Json::String(current.owner.clone());
        base["created_at"] = Json::String(current.created_at.clone());
        base["updated_at"] = Json::String(now.clone());

        let updated: Service =
            serde_json::from_value(base).map_err(|e| CatalogError::Internal(e.to_string()))?;

        let indexes: Vec<(&str, Value)> = vec![
            ("name", Value::from(updated.name.clone())),
            ("updated_at", Value::from(now)),
        ];
        self.update_record("services", id, &updated, &indexes)?;
        Ok(updated)
    }

    /// Delete a Service together with its Processes.
    pub fn delete_service(&self, caller: &Caller, id: &str) -> Result<(), CatalogError> {
        let service = self.get_service(caller, id)?;

        self.sql
            .exec(
                "DELETE FROM processes WHERE organization = ?1 AND service = ?2",
                &[Value::from(caller.organization.clone()), Value::from(id)],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        self.delete_scoped("services", id, &caller.organization)?;
        tracing::info!(identifier = %service.identifier, "service deleted");
        Ok(())
    }
}

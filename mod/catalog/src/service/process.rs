use serde_json::Value as Json;

use svcreg_core::{merge_patch, new_id, now_rfc3339, Caller, ListParams, ListResult};
use svcreg_sql::Value;

use crate::model::{CreateProcess, Process, ProcessData};
use crate::projection::{projection_for, render::render, validate::validate, EntityKind, Operation};
use crate::service::identifier::{process_scope, MAX_ALLOCATION_ATTEMPTS};
use crate::service::{CatalogError, CatalogService};

impl CatalogService {
    /// Create a new Process under a Service of the caller's
    /// organization. The ProcessData sub-record does not exist at
    /// creation time; it is materialized by the first nested update.
    pub fn create_process(&self, caller: &Caller, payload: &Json) -> Result<Process, CatalogError> {
        let projection = projection_for(EntityKind::Process, Operation::Create);
        let sanitized = validate(projection, payload, true).map_err(CatalogError::Validation)?;
        let input: CreateProcess = serde_json::from_value(Json::Object(sanitized))
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        let parent = self.get_service(caller, &input.service)?;

        let scope = process_scope(&parent.id);
        let mut last_conflict = String::new();
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let ordinal = self.next_ordinal(&scope)?;
            let now = now_rfc3339();
            let process = Process {
                id: new_id(),
                name: input.name.clone(),
                status: input.status,
                is_internal_client: input.is_internal_client,
                is_external_client: input.is_external_client,
                responsible_authority: input.responsible_authority.clone(),
                department: input.department.clone(),
                is_digital_format: input.is_digital_format,
                is_non_digital_format: input.is_non_digital_format,
                digital_format_link: input.digital_format_link.clone(),
                identifier: format!("{}.{}", parent.identifier, ordinal),
                service: parent.id.clone(),
                organization: parent.organization.clone(),
                owner: caller.user_id.clone(),
                process_data: None,
                created_at: now.clone(),
                updated_at: now,
            };

            let indexes: Vec<(&str, Value)> = vec![
                ("organization", Value::from(process.organization.clone())),
                ("service", Value::from(process.service.clone())),
                ("name", Value::from(process.name.clone())),
                ("status", Value::from(process.status.as_str())),
                ("identifier", Value::from(process.identifier.clone())),
                ("created_at", Value::from(process.created_at.clone())),
                ("updated_at", Value::from(process.updated_at.clone())),
            ];

            match self.insert_record("processes", &process.id, &process, &indexes) {
                Ok(()) => {
                    tracing::info!(identifier = %process.identifier, "process created");
                    return Ok(process);
                }
                Err(CatalogError::Conflict(m)) => {
                    tracing::warn!(
                        attempt,
                        identifier = %process.identifier,
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

    /// Get a Process by id, scoped to the caller's organization.
    pub fn get_process(&self, caller: &Caller, id: &str) -> Result<Process, CatalogError> {
        self.get_scoped("processes", id, &caller.organization)
    }

    /// Retrieve a Process shaped by the `retrieve` projection, with the
    /// ProcessData sub-record inlined from the authoritative copy.
    pub fn retrieve_process(&self, caller: &Caller, id: &str) -> Result<Json, CatalogError> {
        let process = self.get_process(caller, id)?;
        let projection = projection_for(EntityKind::Process, Operation::Retrieve);
        Ok(render(projection, &self.process_source(&process)?))
    }

    /// List Processes. No `list` projection is registered, so the
    /// full-field default applies.
    pub fn list_processes(
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
            &format!("SELECT COUNT(*) as cnt FROM processes WHERE {}", where_sql),
            &query_params,
        )?;

        let limit_idx = query_params.len() + 1;
        let offset_idx = query_params.len() + 2;
        query_params.push(Value::Integer(params.limit as i64));
        query_params.push(Value::Integer(params.offset as i64));
        let processes: Vec<Process> = self.query_records(
            &format!(
                "SELECT data FROM processes WHERE {} ORDER BY created_at LIMIT ?{} OFFSET ?{}",
                where_sql, limit_idx, offset_idx
            ),
            &query_params,
        )?;

        let projection = projection_for(EntityKind::Process, Operation::List);
        let mut items = Vec::with_capacity(processes.len());
        for process in &processes {
            items.push(render(projection, &self.process_source(process)?));
        }

        Ok(ListResult { items, total })
    }

    /// Serialize a Process and re-inline `process_data` from the struct
    /// field, overwriting whatever default serialization produced.
    fn process_source(&self, process: &Process) -> Result<Json, CatalogError> {
        let mut source =
            serde_json::to_value(process).map_err(|e| CatalogError::Internal(e.to_string()))?;
        source["process_data"] = match &process.process_data {
            Some(data) => {
                serde_json::to_value(data).map_err(|e| CatalogError::Internal(e.to_string()))?
            }
            None => Json::Null,
        };
        Ok(source)
    }

    /// Update a Process, coordinating the nested `process_data` write.
    ///
    /// Keys inside a `process_data` payload object are applied onto the
    /// embedded sub-record (created on demand if absent); every other
    /// writable key is applied onto the Process itself. Both land in one
    /// row update, so no partial state is ever observable.
    pub fn update_process(
        &self,
        caller: &Caller,
        id: &str,
        payload: &Json,
    ) -> Result<Process, CatalogError> {
        let projection = projection_for(EntityKind::Process, Operation::Update);
        let mut sanitized = validate(projection, payload, false).map_err(CatalogError::Validation)?;
        let nested = sanitized.remove("process_data");

        let current = self.get_process(caller, id)?;
        let now = now_rfc3339();

        // Flat fields first.
        let mut base =
            serde_json::to_value(&current).map_err(|e| CatalogError::Internal(e.to_string()))?;
        merge_patch(&mut base, &Json::Object(sanitized));
        base["id"] = Json::String(current.id.clone());
        base["identifier"] = Json::String(current.identifier.clone());
        base["service"] = Json::String(current.service.clone());
        base["organization"] = Json::String(current.organization.clone());
        base["owner"] = Json::String(current.owner.clone());
        base["created_at"] = Json::String(current.created_at.clone());
        base["updated_at"] = Json::String(now.clone());

        let mut updated: Process =
            serde_json::from_value(base).map_err(|e| CatalogError::Internal(e.to_string()))?;
        updated.process_data = current.process_data.clone();

        // Then the sub-record. A `null` value is a no-op, matching an
        // absent key.
        if let Some(Json::Object(data_patch)) = nested {
            let existing = updated.process_data.take().unwrap_or_default();
            let mut data_json = serde_json::to_value(&existing)
                .map_err(|e| CatalogError::Internal(e.to_string()))?;
            merge_patch(&mut data_json, &Json::Object(data_patch));
            let merged: ProcessData = serde_json::from_value(data_json)
                .map_err(|e| CatalogError::Internal(e.to_string()))?;
            updated.process_data = Some(merged);
        }

        let indexes: Vec<(&str, Value)> = vec![
            ("name", Value::from(updated.name.clone())),
            ("status", Value::from(updated.status.as_str())),
            ("updated_at", Value::from(now)),
        ];
        self.update_record("processes", id, &updated, &indexes)?;
        Ok(updated)
    }

    /// Delete a Process.
    pub fn delete_process(&self, caller: &Caller, id: &str) -> Result<(), CatalogError> {
        let process = self.get_process(caller, id)?;
        self.delete_scoped("processes", id, &caller.organization)?;
        tracing::info!(identifier = %process.identifier, "process deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::model::{ProcessData, ProcessStatus};
    use crate::service::test_support::service_with_org;
    use crate::service::CatalogError;

    use svcreg_core::Caller;

    fn fixture() -> (std::sync::Arc<super::CatalogService>, Caller, String) {
        let (svc, caller) = service_with_org("MIN");
        let ls = svc
            .create_life_situation(&caller, &json!({"name": "HEALTH"}))
            .unwrap();
        let service = svc
            .create_service(
                &caller,
                &json!({"service_type": "PUBLIC", "name": "svc", "life_situation": ls.id}),
            )
            .unwrap();
        (svc, caller, service.id)
    }

    #[test]
    fn identifiers_chain_to_four_segments() {
        let (svc, caller, service_id) = fixture();
        for k in 1..=2 {
            let p = svc
                .create_process(&caller, &json!({"name": "p", "service": service_id}))
                .unwrap();
            assert_eq!(p.identifier, format!("MIN.1.1.{}", k));
        }
    }

    #[test]
    fn create_defaults_and_discards_process_data() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(
                &caller,
                &json!({
                    "name": "p",
                    "service": service_id,
                    "identifier": "EVIL.1",
                    "process_data": {"client_value": "smuggled"},
                }),
            )
            .unwrap();
        assert_eq!(p.status, ProcessStatus::NotStarted);
        assert_eq!(p.identifier, "MIN.1.1.1");
        // `process_data` is not part of the create projection.
        assert!(p.process_data.is_none());
    }

    #[test]
    fn create_rejects_unknown_status() {
        let (svc, caller, service_id) = fixture();
        let err = svc
            .create_process(
                &caller,
                &json!({"name": "p", "service": service_id, "status": "ARCHIVED"}),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn retrieve_inlines_process_data() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();

        let shaped = svc.retrieve_process(&caller, &p.id).unwrap();
        assert!(shaped["process_data"].is_null());
        assert_eq!(shaped["identifier"], "MIN.1.1.1");
        // Ownership fields stay out of the retrieve shape.
        assert!(shaped.get("organization").is_none());

        svc.update_process(&caller, &p.id, &json!({"process_data": {"group": "g1"}}))
            .unwrap();
        let shaped = svc.retrieve_process(&caller, &p.id).unwrap();
        assert_eq!(shaped["process_data"]["group"], "g1");
        assert!(shaped["process_data"]["client_value"].is_null());
    }

    #[test]
    fn nested_update_touches_only_named_keys() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();

        svc.update_process(
            &caller,
            &p.id,
            &json!({"process_data": {
                "client_value": "old value",
                "input_data": "application form",
                "related_processes": [],
            }}),
        )
        .unwrap();

        let updated = svc
            .update_process(&caller, &p.id, &json!({"process_data": {"client_value": "v"}}))
            .unwrap();
        assert_eq!(
            updated.process_data,
            Some(ProcessData {
                client_value: Some("v".into()),
                input_data: Some("application form".into()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn update_without_process_data_leaves_it_untouched() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();
        svc.update_process(&caller, &p.id, &json!({"process_data": {"output_data": "o"}}))
            .unwrap();

        let updated = svc
            .update_process(
                &caller,
                &p.id,
                &json!({"name": "renamed", "status": "IN_PROGRESS"}),
            )
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.status, ProcessStatus::InProgress);
        assert_eq!(
            updated.process_data,
            Some(ProcessData {
                output_data: Some("o".into()),
                ..Default::default()
            })
        );

        // Explicit null is a no-op too.
        let updated = svc
            .update_process(&caller, &p.id, &json!({"process_data": null}))
            .unwrap();
        assert!(updated.process_data.is_some());
    }

    #[test]
    fn nested_update_materializes_missing_sub_record() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();
        assert!(p.process_data.is_none());

        let updated = svc
            .update_process(&caller, &p.id, &json!({"process_data": {"group": "g"}}))
            .unwrap();
        assert_eq!(updated.process_data.unwrap().group.as_deref(), Some("g"));
    }

    #[test]
    fn flat_and_nested_updates_commit_together() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();

        svc.update_process(
            &caller,
            &p.id,
            &json!({
                "status": "COMPLETED",
                "department": "Archives",
                "process_data": {"output_data": "certificate"},
            }),
        )
        .unwrap();

        let fresh = svc.get_process(&caller, &p.id).unwrap();
        assert_eq!(fresh.status, ProcessStatus::Completed);
        assert_eq!(fresh.department.as_deref(), Some("Archives"));
        assert_eq!(
            fresh.process_data.unwrap().output_data.as_deref(),
            Some("certificate")
        );
    }

    #[test]
    fn update_cannot_move_or_rename_identifier() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();

        let updated = svc
            .update_process(
                &caller,
                &p.id,
                &json!({"service": "elsewhere", "identifier": "HAX", "name": "ok"}),
            )
            .unwrap();
        assert_eq!(updated.service, service_id);
        assert_eq!(updated.identifier, "MIN.1.1.1");
        assert_eq!(updated.name, "ok");
    }

    #[test]
    fn cross_org_access_is_not_found() {
        let (svc, caller, service_id) = fixture();
        let p = svc
            .create_process(&caller, &json!({"name": "p", "service": service_id}))
            .unwrap();

        svc.ensure_organization("CITY", "City").unwrap();
        let other = Caller::new("u-2", "CITY");
        assert!(matches!(
            svc.retrieve_process(&other, &p.id).unwrap_err(),
            CatalogError::NotFound(_)
        ));
        assert!(matches!(
            svc.update_process(&other, &p.id, &json!({"name": "x"})).unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }
}

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use svcreg_core::{Caller, ListParams, ServiceError};

use crate::api::{to_json, AppState};
use crate::projection::{describe::describe, projection_for, render::render, EntityKind, Operation};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/processes", get(list).post(create))
        .route("/processes/identifier", get(preview_identifier))
        .route("/processes/schema", get(schema))
        .route("/processes/{id}", get(retrieve).put(update).delete(destroy))
}

async fn list(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_processes(&caller, &params).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn create(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    let process = svc.create_process(&caller, &payload).map_err(ServiceError::from)?;
    let projection = projection_for(EntityKind::Process, Operation::Create);
    let body = render(projection, &to_json(&process)?);
    Ok((axum::http::StatusCode::CREATED, Json(body)))
}

async fn retrieve(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let body = svc.retrieve_process(&caller, &id).map_err(ServiceError::from)?;
    Ok(Json(body))
}

async fn update(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let process = svc
        .update_process(&caller, &id, &payload)
        .map_err(ServiceError::from)?;
    let projection = projection_for(EntityKind::Process, Operation::Update);

    // The update shape embeds the sub-record: re-inline it from the
    // authoritative struct field before rendering.
    let mut source = to_json(&process)?;
    source["process_data"] = match &process.process_data {
        Some(data) => to_json(data)?,
        None => serde_json::Value::Null,
    };
    Ok(Json(render(projection, &source)))
}

async fn destroy(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ServiceError> {
    svc.delete_process(&caller, &id).map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    service_id: String,
}

/// Dry-run preview of the next identifier under a Service.
async fn preview_identifier(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let identifier = svc
        .preview_process_identifier(&caller, &params.service_id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "identifier": identifier })))
}

/// Field descriptors for every registered operation on this kind.
async fn schema() -> Json<serde_json::Value> {
    Json(describe(EntityKind::Process))
}

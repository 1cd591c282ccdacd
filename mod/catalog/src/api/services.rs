use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use svcreg_core::{Caller, ListParams, ServiceError};

use crate::api::{to_json, AppState};
use crate::projection::{describe::describe, projection_for, render::render, EntityKind, Operation};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list).post(create))
        .route("/services/identifier", get(preview_identifier))
        .route("/services/schema", get(schema))
        .route("/services/{id}", get(retrieve).put(update).delete(destroy))
}

async fn list(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_services(&caller, &params).map_err(ServiceError::from)?;
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
    let service = svc.create_service(&caller, &payload).map_err(ServiceError::from)?;
    let projection = projection_for(EntityKind::Service, Operation::Create);
    let body = render(projection, &to_json(&service)?);
    Ok((axum::http::StatusCode::CREATED, Json(body)))
}

async fn retrieve(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let body = svc.retrieve_service(&caller, &id).map_err(ServiceError::from)?;
    Ok(Json(body))
}

async fn update(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let service = svc
        .update_service(&caller, &id, &payload)
        .map_err(ServiceError::from)?;
    let projection = projection_for(EntityKind::Service, Operation::Update);
    Ok(Json(render(projection, &to_json(&service)?)))
}

async fn destroy(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ServiceError> {
    svc.delete_service(&caller, &id).map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    life_situation_id: String,
}

/// Dry-run preview of the next identifier under a LifeSituation.
async fn preview_identifier(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let identifier = svc
        .preview_service_identifier(&caller, &params.life_situation_id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "identifier": identifier })))
}

/// Field descriptors for every registered operation on this kind.
async fn schema() -> Json<serde_json::Value> {
    Json(describe(EntityKind::Service))
}

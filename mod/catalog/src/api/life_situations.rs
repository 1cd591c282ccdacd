use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};

use svcreg_core::{Caller, ListParams, ServiceError};

use crate::api::{to_json, AppState};
use crate::projection::{describe::describe, projection_for, render::render, EntityKind, Operation};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/life-situations", get(list).post(create))
        .route("/life-situations/identifier", get(preview_identifier))
        .route("/life-situations/schema", get(schema))
        .route(
            "/life-situations/{id}",
            get(retrieve).put(update).delete(destroy),
        )
}

async fn list(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc
        .list_life_situations(&caller, &params)
        .map_err(ServiceError::from)?;
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
    let ls = svc
        .create_life_situation(&caller, &payload)
        .map_err(ServiceError::from)?;
    let projection = projection_for(EntityKind::LifeSituation, Operation::Create);
    let body = render(projection, &to_json(&ls)?);
    Ok((axum::http::StatusCode::CREATED, Json(body)))
}

async fn retrieve(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let body = svc
        .retrieve_life_situation(&caller, &id)
        .map_err(ServiceError::from)?;
    Ok(Json(body))
}

async fn update(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let ls = svc
        .update_life_situation(&caller, &id, &payload)
        .map_err(ServiceError::from)?;
    let projection = projection_for(EntityKind::LifeSituation, Operation::Update);
    Ok(Json(render(projection, &to_json(&ls)?)))
}

async fn destroy(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ServiceError> {
    svc.delete_life_situation(&caller, &id)
        .map_err(ServiceError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Dry-run preview of the next identifier. Does not reserve it.
async fn preview_identifier(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let identifier = svc
        .preview_life_situation_identifier(&caller)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "identifier": identifier })))
}

/// Field descriptors for every registered operation on this kind.
async fn schema() -> Json<serde_json::Value> {
    Json(describe(EntityKind::LifeSituation))
}

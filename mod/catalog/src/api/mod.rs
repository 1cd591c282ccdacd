mod life_situations;
mod processes;
mod services;

use std::sync::Arc;

use axum::Router;
use serde::Serialize;

use svcreg_core::ServiceError;

use crate::service::CatalogService;

/// Shared application state.
pub type AppState = Arc<CatalogService>;

/// Build the complete catalog API router.
///
/// All routes are relative — the caller nests them under `/catalog`.
/// Handlers expect an authenticated [`svcreg_core::Caller`] in request
/// extensions; the binary's auth middleware puts it there.
pub fn build_router(svc: Arc<CatalogService>) -> Router {
    Router::new()
        .merge(life_situations::routes())
        .merge(services::routes())
        .merge(processes::routes())
        .with_state(svc)
}

/// Serialize a response body, mapping failures to an internal error.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))
}

//! Route registration — collects all module routes + system endpoints.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Router};

use crate::auth_middleware::{self, JwtState};

/// Build the complete router with all routes.
///
/// Module routes are nested under `/{module_name}` and everything except
/// the public system endpoints sits behind the JWT middleware.
pub fn build_router(jwt_state: Arc<JwtState>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }

    app.layer(middleware::from_fn_with_state(
        jwt_state,
        auth_middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "svcregd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

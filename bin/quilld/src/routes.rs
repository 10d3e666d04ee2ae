//! Route registration — module routes + system endpoints under `/api`.

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use quill_core::{now_rfc3339, Envelope, ServiceError};

use crate::cors;

/// Build the complete router with all routes.
///
/// Module routers are merged under `/api` alongside the system endpoints;
/// unmatched paths fall through to a 404 in the standard envelope.
pub fn build_router(module_routes: Vec<Router>) -> Router {
    let mut api = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for router in module_routes {
        api = api.merge(router);
    }

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(middleware::from_fn(cors::cors_middleware))
}

async fn health() -> impl IntoResponse {
    Json(Envelope::ok(serde_json::json!({
        "status": "ok",
        "timestamp": now_rfc3339(),
    })))
}

async fn version() -> impl IntoResponse {
    Json(Envelope::ok(serde_json::json!({
        "name": "quilld",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

async fn not_found() -> ServiceError {
    ServiceError::NotFound("endpoint not found".into())
}

use crate::auth::{auth_routes, require_admin, AuthState};
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use school_clearance::clearance::{clearance_router, ClearanceService, ClearanceStore};
use serde_json::json;
use std::sync::Arc;

/// Operational endpoints, the auth surface and the cookie-protected clearance API.
pub(crate) fn with_clearance_routes<S>(
    service: Arc<ClearanceService<S>>,
    auth: AuthState,
) -> axum::Router
where
    S: ClearanceStore + 'static,
{
    clearance_router(service)
        .route_layer(middleware::from_fn(require_admin))
        .merge(auth_routes(auth))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

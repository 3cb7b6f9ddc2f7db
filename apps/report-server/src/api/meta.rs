use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{openapi::HealthOk, AppState};

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Meta",
    responses((status = 200, description = "Service is up", body = HealthOk))
)]
pub async fn healthz() -> Json<HealthOk> {
    Json(HealthOk { ok: true })
}

/// Service name, version and the registered endpoints.
#[utoipa::path(
    get,
    path = "/about",
    tag = "Meta",
    responses((status = 200, description = "Service description", body = serde_json::Value))
)]
pub async fn about(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": state.endpoints().as_slice(),
        "endpoints_meta": state.endpoints_meta().as_slice(),
    }))
}

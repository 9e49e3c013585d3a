//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_reachable: bool,
    pub uptime_secs: u64,
}

/// `GET /api/health`: liveness plus store reachability. Unauthenticated.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let store_reachable = ctx.state.store_reachable();

    Json(HealthResponse {
        status: if store_reachable { "ok" } else { "degraded" },
        version: crate::config::APP_VERSION,
        store_reachable,
        uptime_secs: ctx.state.uptime_secs(),
    })
}

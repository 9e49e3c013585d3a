//! Audit logging middleware.
//!
//! Logs every admin API request with admin_id, method, path, status and
//! latency. Runs innermost (after auth has injected AdminContext).

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::AdminContext;

/// Log API access for audit trail.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let admin_id = req
        .extensions()
        .get::<AdminContext>()
        .map(|a| a.admin_id.to_string());
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        target: "organlink::audit",
        admin_id = admin_id.as_deref().unwrap_or("-"),
        %method,
        path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "API access"
    );

    response
}

//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, hashes it, looks the hash up in
//! `admins.token_hash` and injects `AdminContext` into request extensions
//! for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{hash_token, AdminContext, ApiContext};
use crate::db;

/// Require a valid admin bearer token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_admin_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_admin_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token_hash = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(hash_token)
        .ok_or(ApiError::Unauthorized)?;

    // Connection dropped here, before any .await
    let admin = {
        let conn = ctx.state.open_db()?;
        db::find_admin_by_token_hash(&conn, &token_hash)?
    };
    let admin = admin.ok_or_else(|| {
        tracing::debug!("Rejected unknown bearer token");
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(AdminContext {
        admin_id: admin.id,
        name: admin.name,
        role: admin.role,
    });

    Ok(next.run(req).await)
}

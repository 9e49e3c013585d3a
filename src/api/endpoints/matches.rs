//! `GET /api/admin/matches?status=`: matches, newest first.

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{MatchFilter, OrganMatch};

#[derive(Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<OrganMatch>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(filter): Query<MatchFilter>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let matches = db::list_matches(&conn, &filter)?;
    Ok(Json(MatchListResponse { matches }))
}

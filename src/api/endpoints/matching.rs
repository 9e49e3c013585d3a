//! Manual matching trigger.
//!
//! `POST /api/admin/matching/run`: runs one pass and returns its outcome
//! verbatim. Incompatible or failing pairs never fail the request.

use axum::extract::State;
use axum::Extension;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AdminContext, ApiContext};
use crate::matching::MatchingOutcome;

pub async fn run(
    State(ctx): State<ApiContext>,
    Extension(admin): Extension<AdminContext>,
) -> Result<Json<MatchingOutcome>, ApiError> {
    tracing::info!(admin_id = %admin.admin_id, "Manual matching pass requested");

    let outcome = ctx.state.run_matching().await?;

    Ok(Json(outcome))
}

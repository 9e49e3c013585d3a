//! Admin confirmation of donor and recipient requests.
//!
//! `POST /api/admin/donor-requests/:id/confirmation`
//! `POST /api/admin/recipient-requests/:id/confirmation`
//!
//! Body: `{"decision": "fulfilled" | "rejected" | "pending"}`. Only
//! `fulfilled` requests enter the matching pools.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AdminContext, ApiContext};
use crate::db;
use crate::models::enums::AdminConfirmation;
use crate::models::{DonorRequest, RecipientRequest};

#[derive(Debug, Deserialize)]
pub struct ConfirmationRequest {
    pub decision: AdminConfirmation,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid request id: {raw}")))
}

pub async fn donor(
    State(ctx): State<ApiContext>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
    body: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Result<Json<DonorRequest>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let conn = ctx.state.open_db()?;

    let request = db::confirm_donor_request(&conn, &id, body.decision, &admin.admin_id)?;

    tracing::info!(
        admin_id = %admin.admin_id,
        donor_request = %id,
        decision = body.decision.as_str(),
        "Donor request confirmation recorded"
    );
    Ok(Json(request))
}

pub async fn recipient(
    State(ctx): State<ApiContext>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
    body: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Result<Json<RecipientRequest>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let conn = ctx.state.open_db()?;

    let request = db::confirm_recipient_request(&conn, &id, body.decision, &admin.admin_id)?;

    tracing::info!(
        admin_id = %admin.admin_id,
        recipient_request = %id,
        decision = body.decision.as_str(),
        "Recipient request confirmation recorded"
    );
    Ok(Json(request))
}

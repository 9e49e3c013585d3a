use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AdminConfirmation, BloodGroup, OrganType, RequestStatus, UrgencyLevel};

/// A donor's offer of one organ. `status` is driven by the matching engine,
/// `admin_confirmation` by a human reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRequest {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub organ_type: OrganType,
    pub blood_group: BloodGroup,
    pub status: RequestStatus,
    pub admin_confirmation: AdminConfirmation,
    pub admin_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientRequest {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub organ_type: OrganType,
    pub blood_group: BloodGroup,
    pub urgency_level: UrgencyLevel,
    pub status: RequestStatus,
    pub admin_confirmation: AdminConfirmation,
    pub admin_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

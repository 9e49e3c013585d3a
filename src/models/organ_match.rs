use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MatchStatus, OrganType};

/// A proposed donor/recipient pairing awaiting human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganMatch {
    pub id: Uuid,
    pub organ_type: OrganType,
    pub donor_id: Uuid,
    pub donor_request_id: Uuid,
    pub recipient_id: Uuid,
    pub recipient_request_id: Uuid,
    pub admin_id: Uuid,
    pub status: MatchStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
}

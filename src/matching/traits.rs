//! Storage seam for the matching engine.
//!
//! The engine only needs the reads and writes below; `SqliteMatchingStore`
//! implements them over the repository layer.

use rusqlite::Connection;
use uuid::Uuid;

use super::error::MatchingError;
use super::types::RecordOutcome;
use crate::models::enums::OrganType;
use crate::models::*;

pub trait MatchingStore: Send + Sync {
    /// Donor requests with `status = pending` and `adminConfirmation = fulfilled`.
    fn pending_donor_requests(&self, conn: &Connection)
        -> Result<Vec<DonorRequest>, MatchingError>;

    /// Recipient requests with `status = pending` and `adminConfirmation = fulfilled`.
    fn pending_recipient_requests(
        &self,
        conn: &Connection,
    ) -> Result<Vec<RecipientRequest>, MatchingError>;

    /// The admin assigned to every match created in this pass.
    fn assignment_admin(&self, conn: &Connection) -> Result<Admin, MatchingError>;

    /// Current medical profile of the donor. Missing donor is an error.
    fn donor_profile(&self, conn: &Connection, donor_id: &Uuid)
        -> Result<MedicalProfile, MatchingError>;

    /// Current medical profile of the recipient. Missing recipient is an error.
    fn recipient_profile(
        &self,
        conn: &Connection,
        recipient_id: &Uuid,
    ) -> Result<MedicalProfile, MatchingError>;

    /// Whether an awaiting-approval match already exists for the triple.
    fn has_awaiting_match(
        &self,
        conn: &Connection,
        organ: OrganType,
        donor_request_id: &Uuid,
        recipient_request_id: &Uuid,
    ) -> Result<bool, MatchingError>;

    /// Consume both requests and persist the match atomically.
    ///
    /// Consumption is conditional on each request still being pending; if
    /// either was taken, nothing is written.
    fn record_match(
        &self,
        conn: &Connection,
        organ_match: &OrganMatch,
    ) -> Result<RecordOutcome, MatchingError>;
}

//! SQLite-backed [`MatchingStore`].

use rusqlite::Connection;
use uuid::Uuid;

use super::error::MatchingError;
use super::traits::MatchingStore;
use super::types::RecordOutcome;
use crate::db::repository;
use crate::models::enums::OrganType;
use crate::models::*;

pub struct SqliteMatchingStore;

impl SqliteMatchingStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteMatchingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingStore for SqliteMatchingStore {
    fn pending_donor_requests(
        &self,
        conn: &Connection,
    ) -> Result<Vec<DonorRequest>, MatchingError> {
        Ok(repository::list_pending_donor_requests(conn)?)
    }

    fn pending_recipient_requests(
        &self,
        conn: &Connection,
    ) -> Result<Vec<RecipientRequest>, MatchingError> {
        Ok(repository::list_pending_recipient_requests(conn)?)
    }

    fn assignment_admin(&self, conn: &Connection) -> Result<Admin, MatchingError> {
        repository::find_assignment_admin(conn)?.ok_or(MatchingError::NoAssignmentAdmin)
    }

    fn donor_profile(
        &self,
        conn: &Connection,
        donor_id: &Uuid,
    ) -> Result<MedicalProfile, MatchingError> {
        repository::get_donor_profile(conn, donor_id)?
            .ok_or(MatchingError::DonorNotFound(*donor_id))
    }

    fn recipient_profile(
        &self,
        conn: &Connection,
        recipient_id: &Uuid,
    ) -> Result<MedicalProfile, MatchingError> {
        repository::get_recipient_profile(conn, recipient_id)?
            .ok_or(MatchingError::RecipientNotFound(*recipient_id))
    }

    fn has_awaiting_match(
        &self,
        conn: &Connection,
        organ: OrganType,
        donor_request_id: &Uuid,
        recipient_request_id: &Uuid,
    ) -> Result<bool, MatchingError> {
        Ok(
            repository::find_awaiting_match(conn, organ, donor_request_id, recipient_request_id)?
                .is_some(),
        )
    }

    fn record_match(
        &self,
        conn: &Connection,
        organ_match: &OrganMatch,
    ) -> Result<RecordOutcome, MatchingError> {
        let tx = conn.unchecked_transaction()?;

        // Dropping `tx` without commit rolls back the donor consume.
        if !repository::consume_donor_request(&tx, &organ_match.donor_request_id)? {
            return Ok(RecordOutcome::DonorTaken);
        }
        if !repository::consume_recipient_request(&tx, &organ_match.recipient_request_id)? {
            return Ok(RecordOutcome::RecipientTaken);
        }
        repository::insert_match(&tx, organ_match)?;

        tx.commit()?;
        Ok(RecordOutcome::Recorded)
    }
}

//! Donor and recipient requests: insertion, pending pools, admin
//! confirmation, and the conditional consume used by matching.

use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, now_timestamp, parse_timestamp, parse_uuid};
use super::{mark_donor_verified, mark_recipient_verified};
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

pub fn insert_donor_request(conn: &Connection, req: &DonorRequest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO donor_requests (id, donor_id, organ_type, blood_group, status,
         admin_confirmation, admin_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            req.id.to_string(),
            req.donor_id.to_string(),
            req.organ_type.as_str(),
            req.blood_group.as_str(),
            req.status.as_str(),
            req.admin_confirmation.as_str(),
            req.admin_id.map(|id| id.to_string()),
            format_timestamp(&req.created_at),
            format_timestamp(&req.updated_at),
        ],
    )?;
    Ok(())
}

pub fn insert_recipient_request(
    conn: &Connection,
    req: &RecipientRequest,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO recipient_requests (id, recipient_id, organ_type, blood_group,
         urgency_level, status, admin_confirmation, admin_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            req.id.to_string(),
            req.recipient_id.to_string(),
            req.organ_type.as_str(),
            req.blood_group.as_str(),
            req.urgency_level.as_str(),
            req.status.as_str(),
            req.admin_confirmation.as_str(),
            req.admin_id.map(|id| id.to_string()),
            format_timestamp(&req.created_at),
            format_timestamp(&req.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_donor_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<DonorRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, donor_id, organ_type, blood_group, status, admin_confirmation,
         admin_id, created_at, updated_at
         FROM donor_requests WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id.to_string()], read_donor_request_row);

    match result {
        Ok(row) => Ok(Some(donor_request_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_recipient_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<RecipientRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, organ_type, blood_group, status, admin_confirmation,
         admin_id, created_at, updated_at, urgency_level
         FROM recipient_requests WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id.to_string()], read_recipient_request_row);

    match result {
        Ok(row) => Ok(Some(recipient_request_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Donor requests eligible for matching: pending and admin-confirmed,
/// oldest first.
pub fn list_pending_donor_requests(conn: &Connection) -> Result<Vec<DonorRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, donor_id, organ_type, blood_group, status, admin_confirmation,
         admin_id, created_at, updated_at
         FROM donor_requests
         WHERE status = 'pending' AND admin_confirmation = 'fulfilled'
         ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt
        .query_map([], read_donor_request_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(donor_request_from_row).collect()
}

/// Recipient requests eligible for matching: pending and admin-confirmed,
/// oldest first.
pub fn list_pending_recipient_requests(
    conn: &Connection,
) -> Result<Vec<RecipientRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, organ_type, blood_group, status, admin_confirmation,
         admin_id, created_at, updated_at, urgency_level
         FROM recipient_requests
         WHERE status = 'pending' AND admin_confirmation = 'fulfilled'
         ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt
        .query_map([], read_recipient_request_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(recipient_request_from_row).collect()
}

/// Record an admin's decision on a donor request. A `fulfilled` decision
/// also verifies the donor, in the same transaction.
pub fn confirm_donor_request(
    conn: &Connection,
    id: &Uuid,
    decision: AdminConfirmation,
    admin_id: &Uuid,
) -> Result<DonorRequest, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE donor_requests SET admin_confirmation = ?2, admin_id = ?3, updated_at = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            decision.as_str(),
            admin_id.to_string(),
            format_timestamp(&now_timestamp()),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("donor_request", id));
    }
    let request = get_donor_request(&tx, id)?
        .ok_or_else(|| DatabaseError::not_found("donor_request", id))?;
    if decision == AdminConfirmation::Fulfilled {
        mark_donor_verified(&tx, &request.donor_id)?;
    }
    tx.commit()?;
    Ok(request)
}

/// Record an admin's decision on a recipient request. A `fulfilled`
/// decision also verifies the recipient, in the same transaction.
pub fn confirm_recipient_request(
    conn: &Connection,
    id: &Uuid,
    decision: AdminConfirmation,
    admin_id: &Uuid,
) -> Result<RecipientRequest, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE recipient_requests SET admin_confirmation = ?2, admin_id = ?3, updated_at = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            decision.as_str(),
            admin_id.to_string(),
            format_timestamp(&now_timestamp()),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("recipient_request", id));
    }
    let request = get_recipient_request(&tx, id)?
        .ok_or_else(|| DatabaseError::not_found("recipient_request", id))?;
    if decision == AdminConfirmation::Fulfilled {
        mark_recipient_verified(&tx, &request.recipient_id)?;
    }
    tx.commit()?;
    Ok(request)
}

/// Move a donor request from `pending` to `matched`.
///
/// Compare-and-swap: returns `false` without writing when the request is no
/// longer pending or no longer confirmed, e.g. a concurrent pass got there
/// first.
pub fn consume_donor_request(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE donor_requests SET status = 'matched', updated_at = ?2
         WHERE id = ?1 AND status = 'pending' AND admin_confirmation = 'fulfilled'",
        params![id.to_string(), format_timestamp(&now_timestamp())],
    )?;
    Ok(updated == 1)
}

/// Recipient-side counterpart of [`consume_donor_request`].
pub fn consume_recipient_request(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE recipient_requests SET status = 'matched', updated_at = ?2
         WHERE id = ?1 AND status = 'pending' AND admin_confirmation = 'fulfilled'",
        params![id.to_string(), format_timestamp(&now_timestamp())],
    )?;
    Ok(updated == 1)
}

// Internal row types: read raw columns, convert outside the rusqlite closure

struct RequestRow {
    id: String,
    owner_id: String,
    organ_type: String,
    blood_group: String,
    status: String,
    admin_confirmation: String,
    admin_id: Option<String>,
    created_at: String,
    updated_at: String,
}

struct RecipientRequestRow {
    base: RequestRow,
    urgency_level: String,
}

fn read_request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        organ_type: row.get(2)?,
        blood_group: row.get(3)?,
        status: row.get(4)?,
        admin_confirmation: row.get(5)?,
        admin_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn read_donor_request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RequestRow> {
    read_request_row(row)
}

fn read_recipient_request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecipientRequestRow> {
    Ok(RecipientRequestRow {
        base: read_request_row(row)?,
        urgency_level: row.get(9)?,
    })
}

fn donor_request_from_row(row: RequestRow) -> Result<DonorRequest, DatabaseError> {
    Ok(DonorRequest {
        id: parse_uuid("donor_requests.id", &row.id)?,
        donor_id: parse_uuid("donor_requests.donor_id", &row.owner_id)?,
        organ_type: OrganType::from_str(&row.organ_type)?,
        blood_group: BloodGroup::from_str(&row.blood_group)?,
        status: RequestStatus::from_str(&row.status)?,
        admin_confirmation: AdminConfirmation::from_str(&row.admin_confirmation)?,
        admin_id: row.admin_id.and_then(|s| Uuid::parse_str(&s).ok()),
        created_at: parse_timestamp("donor_requests.created_at", &row.created_at)?,
        updated_at: parse_timestamp("donor_requests.updated_at", &row.updated_at)?,
    })
}

fn recipient_request_from_row(row: RecipientRequestRow) -> Result<RecipientRequest, DatabaseError> {
    let base = row.base;
    Ok(RecipientRequest {
        id: parse_uuid("recipient_requests.id", &base.id)?,
        recipient_id: parse_uuid("recipient_requests.recipient_id", &base.owner_id)?,
        organ_type: OrganType::from_str(&base.organ_type)?,
        blood_group: BloodGroup::from_str(&base.blood_group)?,
        urgency_level: UrgencyLevel::from_str(&row.urgency_level)?,
        status: RequestStatus::from_str(&base.status)?,
        admin_confirmation: AdminConfirmation::from_str(&base.admin_confirmation)?,
        admin_id: base.admin_id.and_then(|s| Uuid::parse_str(&s).ok()),
        created_at: parse_timestamp("recipient_requests.created_at", &base.created_at)?,
        updated_at: parse_timestamp("recipient_requests.updated_at", &base.updated_at)?,
    })
}

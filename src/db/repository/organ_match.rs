use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{MatchStatus, OrganType};
use crate::models::*;

pub fn insert_match(conn: &Connection, m: &OrganMatch) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO matches (id, organ_type, donor_id, donor_request_id, recipient_id,
         recipient_request_id, admin_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            m.id.to_string(),
            m.organ_type.as_str(),
            m.donor_id.to_string(),
            m.donor_request_id.to_string(),
            m.recipient_id.to_string(),
            m.recipient_request_id.to_string(),
            m.admin_id.to_string(),
            m.status.as_str(),
            format_timestamp(&m.created_at),
        ],
    )?;
    Ok(())
}

/// The awaiting-approval match for this (organ, donor request, recipient
/// request) triple, if one exists.
pub fn find_awaiting_match(
    conn: &Connection,
    organ: OrganType,
    donor_request_id: &Uuid,
    recipient_request_id: &Uuid,
) -> Result<Option<OrganMatch>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, organ_type, donor_id, donor_request_id, recipient_id,
         recipient_request_id, admin_id, status, created_at
         FROM matches
         WHERE organ_type = ?1 AND donor_request_id = ?2 AND recipient_request_id = ?3
           AND status = 'awaiting-approval'
         LIMIT 1",
    )?;
    let result = stmt.query_row(
        params![
            organ.as_str(),
            donor_request_id.to_string(),
            recipient_request_id.to_string(),
        ],
        read_match_row,
    );

    match result {
        Ok(row) => Ok(Some(match_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Matches, newest first, optionally restricted to one status.
pub fn list_matches(
    conn: &Connection,
    filter: &MatchFilter,
) -> Result<Vec<OrganMatch>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, organ_type, donor_id, donor_request_id, recipient_id,
         recipient_request_id, admin_id, status, created_at
         FROM matches
         WHERE ?1 IS NULL OR status = ?1
         ORDER BY created_at DESC, id ASC",
    )?;
    let rows = stmt
        .query_map(params![filter.status.map(|s| s.as_str())], read_match_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(match_from_row).collect()
}

pub fn count_matches(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
    Ok(count)
}

struct MatchRow {
    id: String,
    organ_type: String,
    donor_id: String,
    donor_request_id: String,
    recipient_id: String,
    recipient_request_id: String,
    admin_id: String,
    status: String,
    created_at: String,
}

fn read_match_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MatchRow> {
    Ok(MatchRow {
        id: row.get(0)?,
        organ_type: row.get(1)?,
        donor_id: row.get(2)?,
        donor_request_id: row.get(3)?,
        recipient_id: row.get(4)?,
        recipient_request_id: row.get(5)?,
        admin_id: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn match_from_row(row: MatchRow) -> Result<OrganMatch, DatabaseError> {
    Ok(OrganMatch {
        id: parse_uuid("matches.id", &row.id)?,
        organ_type: OrganType::from_str(&row.organ_type)?,
        donor_id: parse_uuid("matches.donor_id", &row.donor_id)?,
        donor_request_id: parse_uuid("matches.donor_request_id", &row.donor_request_id)?,
        recipient_id: parse_uuid("matches.recipient_id", &row.recipient_id)?,
        recipient_request_id: parse_uuid(
            "matches.recipient_request_id",
            &row.recipient_request_id,
        )?,
        admin_id: parse_uuid("matches.admin_id", &row.admin_id)?,
        status: MatchStatus::from_str(&row.status)?,
        created_at: parse_timestamp("matches.created_at", &row.created_at)?,
    })
}

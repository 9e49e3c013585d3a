use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::AdminRole;
use crate::models::*;

pub fn insert_admin(conn: &Connection, admin: &Admin) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO admins (id, name, email, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            admin.id.to_string(),
            admin.name,
            admin.email,
            admin.role.as_str(),
            format_timestamp(&admin.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_admin(conn: &Connection, id: &Uuid) -> Result<Option<Admin>, DatabaseError> {
    query_one_admin(
        conn,
        "SELECT id, name, email, role, created_at FROM admins WHERE id = ?1",
        &id.to_string(),
    )
}

pub fn find_admin_by_email(conn: &Connection, email: &str) -> Result<Option<Admin>, DatabaseError> {
    query_one_admin(
        conn,
        "SELECT id, name, email, role, created_at FROM admins WHERE email = ?1",
        email,
    )
}

/// The admin every match of a pass is assigned to.
///
/// Ordered by `(created_at, id)`, which is covered by `idx_admins_assignment`,
/// so the choice is stable across passes until an older admin appears.
pub fn find_assignment_admin(conn: &Connection) -> Result<Option<Admin>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, role, created_at FROM admins
         ORDER BY created_at ASC, id ASC LIMIT 1",
    )?;
    let result = stmt.query_row([], read_admin_row);

    match result {
        Ok(row) => Ok(Some(admin_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Store the SHA-256 hash of an admin's bearer token, replacing any previous one.
pub fn set_admin_token_hash(
    conn: &Connection,
    admin_id: &Uuid,
    token_hash: &[u8; 32],
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE admins SET token_hash = ?2 WHERE id = ?1",
        params![admin_id.to_string(), token_hash.as_slice()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("admin", admin_id));
    }
    Ok(())
}

pub fn find_admin_by_token_hash(
    conn: &Connection,
    token_hash: &[u8; 32],
) -> Result<Option<Admin>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, role, created_at FROM admins WHERE token_hash = ?1",
    )?;
    let result = stmt.query_row(params![token_hash.as_slice()], read_admin_row);

    match result {
        Ok(row) => Ok(Some(admin_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn query_one_admin(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> Result<Option<Admin>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let result = stmt.query_row(params![key], read_admin_row);

    match result {
        Ok(row) => Ok(Some(admin_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct AdminRow {
    id: String,
    name: String,
    email: String,
    role: String,
    created_at: String,
}

fn read_admin_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdminRow> {
    Ok(AdminRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn admin_from_row(row: AdminRow) -> Result<Admin, DatabaseError> {
    Ok(Admin {
        id: parse_uuid("admins.id", &row.id)?,
        name: row.name,
        email: row.email,
        role: AdminRole::from_str(&row.role)?,
        created_at: parse_timestamp("admins.created_at", &row.created_at)?,
    })
}

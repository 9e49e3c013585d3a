//! Donor and recipient profiles.
//!
//! The two tables share a column layout; the SQL is parameterised by a
//! static table name and the rows converted by shared helpers.

use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{BloodGroup, Gender};
use crate::models::*;

const DONORS: &str = "donors";
const RECIPIENTS: &str = "recipients";

pub fn insert_donor(conn: &Connection, donor: &Donor) -> Result<(), DatabaseError> {
    insert_person(
        conn,
        DONORS,
        PersonRef {
            id: &donor.id,
            name: &donor.name,
            email: &donor.email,
            phone: donor.phone.as_deref(),
            medical: donor.medical_profile(),
            location: donor.location.as_deref(),
            is_verified: donor.is_verified,
            created_at: &donor.created_at,
        },
    )
}

pub fn insert_recipient(conn: &Connection, recipient: &Recipient) -> Result<(), DatabaseError> {
    insert_person(
        conn,
        RECIPIENTS,
        PersonRef {
            id: &recipient.id,
            name: &recipient.name,
            email: &recipient.email,
            phone: recipient.phone.as_deref(),
            medical: recipient.medical_profile(),
            location: recipient.location.as_deref(),
            is_verified: recipient.is_verified,
            created_at: &recipient.created_at,
        },
    )
}

pub fn get_donor(conn: &Connection, id: &Uuid) -> Result<Option<Donor>, DatabaseError> {
    let Some(row) = select_person(conn, DONORS, id)? else {
        return Ok(None);
    };
    let p = person_from_row(row)?;
    Ok(Some(Donor {
        id: p.id,
        name: p.name,
        email: p.email,
        phone: p.phone,
        age: p.medical.age,
        weight: p.medical.weight,
        height: p.medical.height,
        gender: p.medical.gender,
        blood_group: p.medical.blood_group,
        location: p.location,
        is_verified: p.is_verified,
        created_at: p.created_at,
    }))
}

pub fn get_recipient(conn: &Connection, id: &Uuid) -> Result<Option<Recipient>, DatabaseError> {
    let Some(row) = select_person(conn, RECIPIENTS, id)? else {
        return Ok(None);
    };
    let p = person_from_row(row)?;
    Ok(Some(Recipient {
        id: p.id,
        name: p.name,
        email: p.email,
        phone: p.phone,
        age: p.medical.age,
        weight: p.medical.weight,
        height: p.medical.height,
        gender: p.medical.gender,
        blood_group: p.medical.blood_group,
        location: p.location,
        is_verified: p.is_verified,
        created_at: p.created_at,
    }))
}

/// Blood group and physique of a donor, as currently stored.
pub fn get_donor_profile(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MedicalProfile>, DatabaseError> {
    select_medical(conn, DONORS, id)
}

/// Blood group and physique of a recipient, as currently stored.
pub fn get_recipient_profile(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MedicalProfile>, DatabaseError> {
    select_medical(conn, RECIPIENTS, id)
}

pub fn mark_donor_verified(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    mark_verified(conn, DONORS, "donor", id)
}

pub fn mark_recipient_verified(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    mark_verified(conn, RECIPIENTS, "recipient", id)
}

// ── Shared helpers ──────────────────────────────────────────

struct PersonRef<'a> {
    id: &'a Uuid,
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    medical: MedicalProfile,
    location: Option<&'a str>,
    is_verified: bool,
    created_at: &'a chrono::NaiveDateTime,
}

fn insert_person(conn: &Connection, table: &str, p: PersonRef<'_>) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO {table} (id, name, email, phone, age, weight, height, gender,
             blood_group, location, is_verified, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            p.id.to_string(),
            p.name,
            p.email,
            p.phone,
            p.medical.age,
            p.medical.weight,
            p.medical.height,
            p.medical.gender.as_str(),
            p.medical.blood_group.as_str(),
            p.location,
            p.is_verified as i32,
            format_timestamp(p.created_at),
        ],
    )?;
    Ok(())
}

fn mark_verified(
    conn: &Connection,
    table: &str,
    entity: &str,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        &format!("UPDATE {table} SET is_verified = 1 WHERE id = ?1"),
        params![id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found(entity, id));
    }
    Ok(())
}

struct PersonRow {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    medical: MedicalRow,
    location: Option<String>,
    is_verified: i32,
    created_at: String,
}

struct MedicalRow {
    age: u32,
    weight: f64,
    height: f64,
    gender: String,
    blood_group: String,
}

struct Person {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    medical: MedicalProfile,
    location: Option<String>,
    is_verified: bool,
    created_at: chrono::NaiveDateTime,
}

fn select_person(
    conn: &Connection,
    table: &str,
    id: &Uuid,
) -> Result<Option<PersonRow>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, email, phone, age, weight, height, gender, blood_group,
         location, is_verified, created_at
         FROM {table} WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(PersonRow {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            medical: MedicalRow {
                age: row.get(4)?,
                weight: row.get(5)?,
                height: row.get(6)?,
                gender: row.get(7)?,
                blood_group: row.get(8)?,
            },
            location: row.get(9)?,
            is_verified: row.get(10)?,
            created_at: row.get(11)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn select_medical(
    conn: &Connection,
    table: &str,
    id: &Uuid,
) -> Result<Option<MedicalProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT age, weight, height, gender, blood_group FROM {table} WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(MedicalRow {
            age: row.get(0)?,
            weight: row.get(1)?,
            height: row.get(2)?,
            gender: row.get(3)?,
            blood_group: row.get(4)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(medical_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn medical_from_row(row: MedicalRow) -> Result<MedicalProfile, DatabaseError> {
    Ok(MedicalProfile {
        blood_group: BloodGroup::from_str(&row.blood_group)?,
        age: row.age,
        weight: row.weight,
        height: row.height,
        gender: Gender::from_str(&row.gender)?,
    })
}

fn person_from_row(row: PersonRow) -> Result<Person, DatabaseError> {
    Ok(Person {
        id: parse_uuid("id", &row.id)?,
        name: row.name,
        email: row.email,
        phone: row.phone,
        medical: medical_from_row(row.medical)?,
        location: row.location,
        is_verified: row.is_verified != 0,
        created_at: parse_timestamp("created_at", &row.created_at)?,
    })
}

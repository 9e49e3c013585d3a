//! Admin account bootstrap: create admins and (re)issue their bearer tokens.

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::issue_admin_token;
use crate::db::{self, DatabaseError};
use crate::models::enums::AdminRole;
use crate::models::Admin;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("An admin with email {0} already exists")]
    EmailTaken(String),
    #[error("No admin with email {0}")]
    UnknownEmail(String),
    #[error("Invalid admin field: {0}")]
    Invalid(&'static str),
}

/// Create an admin and issue its first token.
///
/// Returns the stored admin and the plaintext token, which is not
/// recoverable afterwards.
pub fn create_admin(
    conn: &Connection,
    name: &str,
    email: &str,
    role: AdminRole,
) -> Result<(Admin, String), AdminError> {
    let name = name.trim();
    let email = email.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(AdminError::Invalid("name"));
    }
    if !email.contains('@') {
        return Err(AdminError::Invalid("email"));
    }
    if db::find_admin_by_email(conn, &email)?.is_some() {
        return Err(AdminError::EmailTaken(email));
    }

    let admin = Admin {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email,
        role,
        created_at: db::now_timestamp(),
    };

    let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
    db::insert_admin(&tx, &admin)?;
    let token = issue_admin_token(&tx, &admin.id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(admin_id = %admin.id, role = admin.role.as_str(), "Admin created");
    Ok((admin, token))
}

/// Replace an admin's token. The previous token stops working immediately.
pub fn rotate_admin_token(conn: &Connection, email: &str) -> Result<(Admin, String), AdminError> {
    let email = email.trim().to_ascii_lowercase();
    let admin = db::find_admin_by_email(conn, &email)?
        .ok_or_else(|| AdminError::UnknownEmail(email.clone()))?;
    let token = issue_admin_token(conn, &admin.id)?;
    tracing::info!(admin_id = %admin.id, "Admin token rotated");
    Ok((admin, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::hash_token;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn created_admin_can_authenticate() {
        let conn = open_memory_database().unwrap();
        let (admin, token) =
            create_admin(&conn, "Dr. Okafor", "Okafor@Hospital.org", AdminRole::Medical).unwrap();
        assert_eq!(admin.email, "okafor@hospital.org");

        let found = db::find_admin_by_token_hash(&conn, &hash_token(&token))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, admin.id);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = open_memory_database().unwrap();
        create_admin(&conn, "First", "ward@example.org", AdminRole::Admin).unwrap();
        let err = create_admin(&conn, "Second", "ward@example.org", AdminRole::Admin).unwrap_err();
        assert!(matches!(err, AdminError::EmailTaken(_)));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            create_admin(&conn, "  ", "a@b.org", AdminRole::Admin),
            Err(AdminError::Invalid("name"))
        ));
        assert!(matches!(
            create_admin(&conn, "Name", "not-an-email", AdminRole::Admin),
            Err(AdminError::Invalid("email"))
        ));
    }

    #[test]
    fn rotation_invalidates_old_token() {
        let conn = open_memory_database().unwrap();
        let (_, old) = create_admin(&conn, "Rota", "rota@example.org", AdminRole::Hospital).unwrap();
        let (_, new) = rotate_admin_token(&conn, "rota@example.org").unwrap();

        assert!(db::find_admin_by_token_hash(&conn, &hash_token(&old))
            .unwrap()
            .is_none());
        assert!(db::find_admin_by_token_hash(&conn, &hash_token(&new))
            .unwrap()
            .is_some());
    }

    #[test]
    fn rotating_unknown_email_fails() {
        let conn = open_memory_database().unwrap();
        let err = rotate_admin_token(&conn, "ghost@example.org").unwrap_err();
        assert!(matches!(err, AdminError::UnknownEmail(_)));
    }
}

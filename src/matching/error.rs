//! Errors raised while running a matching pass.

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum MatchingError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Donor {0} referenced by request not found")]
    DonorNotFound(Uuid),

    #[error("Recipient {0} referenced by request not found")]
    RecipientNotFound(Uuid),

    #[error("No admin available to assign matches to")]
    NoAssignmentAdmin,
}

impl From<rusqlite::Error> for MatchingError {
    fn from(err: rusqlite::Error) -> Self {
        MatchingError::Database(DatabaseError::Sqlite(err))
    }
}

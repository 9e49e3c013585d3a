//! Shared application state.
//!
//! `AppState` is built once by the composition root and shared as
//! `Arc<AppState>` between the HTTP layer and the match scheduler. It owns
//! the database location and the lock that keeps matching passes from this
//! process from overlapping.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rusqlite::Connection;

use crate::db;
use crate::matching::{run_matching_process, MatchingOutcome};

pub struct AppState {
    db_path: PathBuf,
    /// Held for the duration of a matching pass.
    pass_lock: Mutex<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            pass_lock: Mutex::new(()),
            started_at: Instant::now(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Open a connection to the store. Failing to open means the store is
    /// unreachable.
    pub fn open_db(&self) -> Result<Connection, StateError> {
        db::open_database(&self.db_path).map_err(StateError::StoreUnavailable)
    }

    pub fn store_reachable(&self) -> bool {
        match self.open_db().and_then(|conn| db::ping(&conn).map_err(StateError::from)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.db_path.display(), error = %e, "Store unreachable");
                false
            }
        }
    }

    /// Run one matching pass on the calling thread.
    ///
    /// Blocks while another pass from this process is in flight.
    pub fn run_matching_blocking(&self) -> Result<MatchingOutcome, StateError> {
        let _guard = self.pass_lock.lock().map_err(|_| StateError::LockPoisoned)?;
        let conn = self.open_db()?;
        Ok(run_matching_process(&conn))
    }

    /// Run one matching pass on the blocking thread pool.
    pub async fn run_matching(self: &Arc<Self>) -> Result<MatchingOutcome, StateError> {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || state.run_matching_blocking())
            .await
            .map_err(|e| StateError::TaskFailed(e.to_string()))?
    }
}

/// Errors from AppState operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] db::DatabaseError),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::models::enums::{AdminConfirmation, BloodGroup, OrganType};

    fn temp_state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().join("organlink.db")));
        (dir, state)
    }

    #[test]
    fn open_db_creates_schema() {
        let (_dir, state) = temp_state();
        let conn = state.open_db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 7);
        assert!(state.store_reachable());
    }

    #[test]
    fn missing_directory_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("absent").join("organlink.db"));
        assert!(matches!(state.open_db(), Err(StateError::StoreUnavailable(_))));
        assert!(!state.store_reachable());
    }

    #[tokio::test]
    async fn run_matching_uses_the_store() {
        let (_dir, state) = temp_state();
        {
            let conn = state.open_db().unwrap();
            fixtures::admin(&conn, "state@example.org");
            let donor = fixtures::donor(&conn, fixtures::medical(BloodGroup::ONegative));
            let recipient = fixtures::recipient(&conn, fixtures::medical(BloodGroup::APositive));
            fixtures::donor_request(&conn, &donor, OrganType::Kidney, AdminConfirmation::Fulfilled);
            fixtures::recipient_request(
                &conn,
                &recipient,
                OrganType::Kidney,
                AdminConfirmation::Fulfilled,
            );
        }

        let first = state.run_matching().await.unwrap();
        assert_eq!(first.matches_created, 1);
        let second = state.run_matching().await.unwrap();
        assert_eq!(second.matches_created, 0);
    }

    #[tokio::test]
    async fn concurrent_passes_create_one_match() {
        let (_dir, state) = temp_state();
        {
            let conn = state.open_db().unwrap();
            fixtures::admin(&conn, "race@example.org");
            let donor = fixtures::donor(&conn, fixtures::medical(BloodGroup::BNegative));
            let recipient = fixtures::recipient(&conn, fixtures::medical(BloodGroup::BPositive));
            fixtures::donor_request(&conn, &donor, OrganType::Liver, AdminConfirmation::Fulfilled);
            fixtures::recipient_request(
                &conn,
                &recipient,
                OrganType::Liver,
                AdminConfirmation::Fulfilled,
            );
        }

        let (a, b) = tokio::join!(state.run_matching(), state.run_matching());
        let total = a.unwrap().matches_created + b.unwrap().matches_created;
        assert_eq!(total, 1);
    }
}

//! MatchingEngine: one sequential pass over the pending pools.

use std::collections::HashSet;
use std::time::Instant;

use rusqlite::Connection;
use uuid::Uuid;

use super::compatibility::check_pair;
use super::error::MatchingError;
use super::store::SqliteMatchingStore;
use super::traits::MatchingStore;
use super::types::*;
use crate::db::repository::now_timestamp;
use crate::models::enums::MatchStatus;
use crate::models::*;

/// Run one matching pass against the SQLite store.
///
/// Entry point shared by the background scheduler and the admin trigger.
pub fn run_matching_process(conn: &Connection) -> MatchingOutcome {
    MatchingEngine::new(Box::new(SqliteMatchingStore::new())).run(conn)
}

pub struct MatchingEngine {
    store: Box<dyn MatchingStore>,
}

enum PairResult {
    Matched,
    Incompatible,
    Duplicate,
    DonorTaken,
    RecipientTaken,
}

impl MatchingEngine {
    pub fn new(store: Box<dyn MatchingStore>) -> Self {
        Self { store }
    }

    /// Scan every (donor request, recipient request) pair once.
    ///
    /// Never fails as a whole once the inputs are loaded: a pair that errors
    /// is recorded in `errors` and the scan moves on. If the pools or the
    /// assignment admin cannot be loaded, returns zero matches and a single
    /// pass-level error.
    pub fn run(&self, conn: &Connection) -> MatchingOutcome {
        let start = Instant::now();

        let (donor_requests, recipient_requests, admin) = match self.load_inputs(conn) {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::error!(error = %e, "Matching pass aborted");
                return MatchingOutcome::aborted(e.to_string());
            }
        };

        tracing::info!(
            donor_requests = donor_requests.len(),
            recipient_requests = recipient_requests.len(),
            admin_id = %admin.id,
            "Matching pass started"
        );

        let mut outcome = MatchingOutcome::default();
        // Recipient requests consumed earlier in this pass
        let mut taken: HashSet<Uuid> = HashSet::new();

        'donors: for dr in &donor_requests {
            for rr in &recipient_requests {
                if taken.contains(&rr.id) || dr.organ_type != rr.organ_type {
                    continue;
                }

                match self.evaluate_pair(conn, dr, rr, &admin) {
                    Ok(PairResult::Matched) => {
                        outcome.matches_created += 1;
                        taken.insert(rr.id);
                        continue 'donors;
                    }
                    Ok(PairResult::DonorTaken) => continue 'donors,
                    Ok(PairResult::RecipientTaken) => {
                        taken.insert(rr.id);
                    }
                    Ok(PairResult::Incompatible) | Ok(PairResult::Duplicate) => {}
                    Err(e) => {
                        tracing::warn!(
                            donor_request = %dr.id,
                            recipient_request = %rr.id,
                            error = %e,
                            "Matching pair failed"
                        );
                        outcome.errors.push(MatchingIssue::Pair(PairFailure {
                            donor_request: dr.id,
                            recipient_request: rr.id,
                            error: e.to_string(),
                        }));
                    }
                }
            }
        }

        tracing::info!(
            matches_created = outcome.matches_created,
            errors = outcome.errors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Matching pass completed"
        );

        outcome
    }

    fn load_inputs(
        &self,
        conn: &Connection,
    ) -> Result<(Vec<DonorRequest>, Vec<RecipientRequest>, Admin), MatchingError> {
        let donors = self.store.pending_donor_requests(conn)?;
        let recipients = self.store.pending_recipient_requests(conn)?;
        let admin = self.store.assignment_admin(conn)?;
        Ok((donors, recipients, admin))
    }

    fn evaluate_pair(
        &self,
        conn: &Connection,
        dr: &DonorRequest,
        rr: &RecipientRequest,
        admin: &Admin,
    ) -> Result<PairResult, MatchingError> {
        let donor = self.store.donor_profile(conn, &dr.donor_id)?;
        let recipient = self.store.recipient_profile(conn, &rr.recipient_id)?;

        if let Err(reason) = check_pair(dr, rr, &donor, &recipient) {
            tracing::debug!(
                donor_request = %dr.id,
                recipient_request = %rr.id,
                ?reason,
                "Pair incompatible"
            );
            return Ok(PairResult::Incompatible);
        }

        if self
            .store
            .has_awaiting_match(conn, dr.organ_type, &dr.id, &rr.id)?
        {
            tracing::debug!(
                donor_request = %dr.id,
                recipient_request = %rr.id,
                "Awaiting-approval match already exists"
            );
            return Ok(PairResult::Duplicate);
        }

        let organ_match = OrganMatch {
            id: Uuid::new_v4(),
            organ_type: dr.organ_type,
            donor_id: dr.donor_id,
            donor_request_id: dr.id,
            recipient_id: rr.recipient_id,
            recipient_request_id: rr.id,
            admin_id: admin.id,
            status: MatchStatus::AwaitingApproval,
            created_at: now_timestamp(),
        };

        let result = match self.store.record_match(conn, &organ_match)? {
            RecordOutcome::Recorded => {
                tracing::info!(
                    match_id = %organ_match.id,
                    organ = organ_match.organ_type.as_str(),
                    donor_request = %dr.id,
                    recipient_request = %rr.id,
                    "Match created"
                );
                PairResult::Matched
            }
            RecordOutcome::DonorTaken => {
                tracing::debug!(donor_request = %dr.id, "Donor request consumed elsewhere");
                PairResult::DonorTaken
            }
            RecordOutcome::RecipientTaken => {
                tracing::debug!(recipient_request = %rr.id, "Recipient request consumed elsewhere");
                PairResult::RecipientTaken
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::params;

    use super::*;
    use crate::db::repository::{self, fixtures};
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;

    fn setup() -> Connection {
        let conn = open_memory_database().unwrap();
        fixtures::admin(&conn, "assign@example.org");
        conn
    }

    fn pair(
        conn: &Connection,
        donor_group: BloodGroup,
        donor_organ: OrganType,
        recipient_group: BloodGroup,
        recipient_organ: OrganType,
        recipient_confirmation: AdminConfirmation,
    ) -> (DonorRequest, RecipientRequest) {
        let donor = fixtures::donor(conn, fixtures::medical(donor_group));
        let recipient = fixtures::recipient(conn, fixtures::medical(recipient_group));
        let dr =
            fixtures::donor_request(conn, &donor, donor_organ, AdminConfirmation::Fulfilled);
        let rr =
            fixtures::recipient_request(conn, &recipient, recipient_organ, recipient_confirmation);
        (dr, rr)
    }

    fn status_of_donor_request(conn: &Connection, id: &Uuid) -> RequestStatus {
        repository::get_donor_request(conn, id).unwrap().unwrap().status
    }

    fn status_of_recipient_request(conn: &Connection, id: &Uuid) -> RequestStatus {
        repository::get_recipient_request(conn, id).unwrap().unwrap().status
    }

    #[test]
    fn compatible_kidney_pair_is_matched() {
        let conn = setup();
        let (dr, rr) = pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Kidney,
            BloodGroup::APositive,
            OrganType::Kidney,
            AdminConfirmation::Fulfilled,
        );

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 1);
        assert!(outcome.errors.is_empty());

        let matches = repository::list_matches(&conn, &MatchFilter::default()).unwrap();
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.organ_type, OrganType::Kidney);
        assert_eq!(m.donor_id, dr.donor_id);
        assert_eq!(m.donor_request_id, dr.id);
        assert_eq!(m.recipient_id, rr.recipient_id);
        assert_eq!(m.recipient_request_id, rr.id);
        assert_eq!(m.status, MatchStatus::AwaitingApproval);

        assert_eq!(status_of_donor_request(&conn, &dr.id), RequestStatus::Matched);
        assert_eq!(status_of_recipient_request(&conn, &rr.id), RequestStatus::Matched);
    }

    #[test]
    fn unconfirmed_recipient_is_never_matched() {
        let conn = setup();
        let (dr, rr) = pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Kidney,
            BloodGroup::APositive,
            OrganType::Kidney,
            AdminConfirmation::Pending,
        );

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 0);
        assert!(outcome.errors.is_empty());
        assert_eq!(status_of_donor_request(&conn, &dr.id), RequestStatus::Pending);
        assert_eq!(status_of_recipient_request(&conn, &rr.id), RequestStatus::Pending);
    }

    #[test]
    fn different_organs_are_never_matched() {
        let conn = setup();
        pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Kidney,
            BloodGroup::APositive,
            OrganType::Liver,
            AdminConfirmation::Fulfilled,
        );

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 0);
        assert_eq!(repository::count_matches(&conn).unwrap(), 0);
    }

    #[test]
    fn incompatible_blood_group_is_not_matched() {
        let conn = setup();
        let (dr, _) = pair(
            &conn,
            BloodGroup::APositive,
            OrganType::Heart,
            BloodGroup::ONegative,
            OrganType::Heart,
            AdminConfirmation::Fulfilled,
        );

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 0);
        assert_eq!(status_of_donor_request(&conn, &dr.id), RequestStatus::Pending);
    }

    #[test]
    fn second_pass_creates_nothing() {
        let conn = setup();
        pair(
            &conn,
            BloodGroup::OPositive,
            OrganType::Lung,
            BloodGroup::AbPositive,
            OrganType::Lung,
            AdminConfirmation::Fulfilled,
        );

        assert_eq!(run_matching_process(&conn).matches_created, 1);
        let second = run_matching_process(&conn);
        assert_eq!(second.matches_created, 0);
        assert!(second.errors.is_empty());
        assert_eq!(repository::count_matches(&conn).unwrap(), 1);
    }

    #[test]
    fn matched_requests_leave_the_pool() {
        let conn = setup();
        let (dr, rr) = pair(
            &conn,
            BloodGroup::BNegative,
            OrganType::Pancreas,
            BloodGroup::BPositive,
            OrganType::Pancreas,
            AdminConfirmation::Fulfilled,
        );
        run_matching_process(&conn);

        let donors = repository::list_pending_donor_requests(&conn).unwrap();
        let recipients = repository::list_pending_recipient_requests(&conn).unwrap();
        assert!(donors.iter().all(|d| d.id != dr.id));
        assert!(recipients.iter().all(|r| r.id != rr.id));
    }

    #[test]
    fn each_request_is_matched_at_most_once() {
        let conn = setup();
        let donor = fixtures::donor(&conn, fixtures::medical(BloodGroup::ONegative));
        let dr = fixtures::donor_request(
            &conn,
            &donor,
            OrganType::Kidney,
            AdminConfirmation::Fulfilled,
        );
        let mut recipient_requests = Vec::new();
        for group in [BloodGroup::APositive, BloodGroup::OPositive] {
            let recipient = fixtures::recipient(&conn, fixtures::medical(group));
            recipient_requests.push(fixtures::recipient_request(
                &conn,
                &recipient,
                OrganType::Kidney,
                AdminConfirmation::Fulfilled,
            ));
        }

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 1);
        assert_eq!(status_of_donor_request(&conn, &dr.id), RequestStatus::Matched);

        let matched = recipient_requests
            .iter()
            .filter(|rr| status_of_recipient_request(&conn, &rr.id) == RequestStatus::Matched)
            .count();
        assert_eq!(matched, 1);
        assert_eq!(repository::list_pending_recipient_requests(&conn).unwrap().len(), 1);
    }

    #[test]
    fn recipient_is_not_reused_by_a_later_donor() {
        let conn = setup();
        let recipient = fixtures::recipient(&conn, fixtures::medical(BloodGroup::AbPositive));
        let rr = fixtures::recipient_request(
            &conn,
            &recipient,
            OrganType::Cornea,
            AdminConfirmation::Fulfilled,
        );
        for group in [BloodGroup::ANegative, BloodGroup::BNegative] {
            let donor = fixtures::donor(&conn, fixtures::medical(group));
            fixtures::donor_request(&conn, &donor, OrganType::Cornea, AdminConfirmation::Fulfilled);
        }

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 1);
        assert_eq!(status_of_recipient_request(&conn, &rr.id), RequestStatus::Matched);
        assert_eq!(repository::list_pending_donor_requests(&conn).unwrap().len(), 1);
    }

    #[test]
    fn failing_pair_does_not_stop_the_pass() {
        let conn = setup();
        let (broken_dr, broken_rr) = pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Liver,
            BloodGroup::OPositive,
            OrganType::Liver,
            AdminConfirmation::Fulfilled,
        );
        let (good_dr, good_rr) = pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Kidney,
            BloodGroup::APositive,
            OrganType::Kidney,
            AdminConfirmation::Fulfilled,
        );

        // Orphan the liver donor request by removing its donor profile.
        conn.execute_batch("PRAGMA foreign_keys=OFF;").unwrap();
        conn.execute(
            "DELETE FROM donors WHERE id = ?1",
            params![broken_dr.donor_id.to_string()],
        )
        .unwrap();

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 1);
        assert_eq!(outcome.errors.len(), 1);
        match &outcome.errors[0] {
            MatchingIssue::Pair(failure) => {
                assert_eq!(failure.donor_request, broken_dr.id);
                assert_eq!(failure.recipient_request, broken_rr.id);
                assert!(failure.error.contains(&broken_dr.donor_id.to_string()));
            }
            other => panic!("expected pair failure, got {other:?}"),
        }
        assert_eq!(status_of_donor_request(&conn, &good_dr.id), RequestStatus::Matched);
        assert_eq!(status_of_recipient_request(&conn, &good_rr.id), RequestStatus::Matched);
        assert_eq!(
            status_of_recipient_request(&conn, &broken_rr.id),
            RequestStatus::Pending
        );
    }

    #[test]
    fn missing_admin_aborts_the_pass() {
        let conn = open_memory_database().unwrap();
        let (dr, _) = pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Kidney,
            BloodGroup::APositive,
            OrganType::Kidney,
            AdminConfirmation::Fulfilled,
        );

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 0);
        assert!(outcome.is_aborted());
        assert_eq!(
            outcome.errors,
            vec![MatchingIssue::Pass(MatchingError::NoAssignmentAdmin.to_string())]
        );
        assert_eq!(status_of_donor_request(&conn, &dr.id), RequestStatus::Pending);
    }

    #[test]
    fn existing_awaiting_match_is_not_duplicated() {
        let conn = setup();
        let (dr, rr) = pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Intestine,
            BloodGroup::ONegative,
            OrganType::Intestine,
            AdminConfirmation::Fulfilled,
        );
        run_matching_process(&conn);

        // Requests reopened by hand while the match still awaits approval.
        conn.execute(
            "UPDATE donor_requests SET status = 'pending' WHERE id = ?1",
            params![dr.id.to_string()],
        )
        .unwrap();
        conn.execute(
            "UPDATE recipient_requests SET status = 'pending' WHERE id = ?1",
            params![rr.id.to_string()],
        )
        .unwrap();

        let outcome = run_matching_process(&conn);
        assert_eq!(outcome.matches_created, 0);
        assert!(outcome.errors.is_empty());
        assert_eq!(repository::count_matches(&conn).unwrap(), 1);
    }

    #[test]
    fn matches_are_assigned_to_the_oldest_admin() {
        let conn = setup();
        let first = repository::find_assignment_admin(&conn).unwrap().unwrap();
        fixtures::admin(&conn, "later@example.org");
        pair(
            &conn,
            BloodGroup::ONegative,
            OrganType::Kidney,
            BloodGroup::APositive,
            OrganType::Kidney,
            AdminConfirmation::Fulfilled,
        );

        run_matching_process(&conn);
        let matches = repository::list_matches(&conn, &MatchFilter::default()).unwrap();
        assert_eq!(matches[0].admin_id, first.id);
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of one matching pass, returned verbatim to the trigger caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingOutcome {
    pub matches_created: u32,
    pub errors: Vec<MatchingIssue>,
}

impl MatchingOutcome {
    /// Outcome of a pass that could not load its inputs.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            matches_created: 0,
            errors: vec![MatchingIssue::Pass(message.into())],
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.errors.iter().any(|e| matches!(e, MatchingIssue::Pass(_)))
    }
}

/// One entry in `MatchingOutcome::errors`: either a single pair that failed
/// or the whole pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchingIssue {
    Pair(PairFailure),
    Pass(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairFailure {
    pub donor_request: Uuid,
    pub recipient_request: Uuid,
    pub error: String,
}

/// What happened when a compatible pair was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Both requests consumed and the match row written.
    Recorded,
    /// The donor request was no longer pending; nothing written.
    DonorTaken,
    /// The recipient request was no longer pending; nothing written.
    RecipientTaken,
}

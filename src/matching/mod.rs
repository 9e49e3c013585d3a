//! Matching engine: pairs pending donor requests with pending recipient
//! requests for the same organ.
//!
//! ```text
//! pending pools ──► organ filter ──► compatibility ──► duplicate check ──► record
//!                                                          (CAS consume + insert, one tx)
//! ```
//!
//! A pass is sequential and runs to completion. It is invoked by
//! [`scheduler`] on a fixed interval and by the admin trigger endpoint;
//! both go through [`run_matching_process`].

pub mod compatibility;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod traits;
pub mod types;

pub use compatibility::{can_donate, check_pair, compatible_recipients, Incompatibility};
pub use engine::{run_matching_process, MatchingEngine};
pub use error::MatchingError;
pub use scheduler::{start_match_scheduler, MatchSchedulerHandle, DEFAULT_MATCH_INTERVAL};
pub use store::SqliteMatchingStore;
pub use traits::MatchingStore;
pub use types::*;

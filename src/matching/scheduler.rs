//! Background match scheduler: periodic matching trigger.
//!
//! Runs a matching pass on a dedicated thread every `interval`. Started and
//! stopped explicitly by the composition root. Startup requires a reachable
//! store; when it is not reachable the scheduler stays disabled and is not
//! retried.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::state::AppState;

/// Default pass interval: every 5 minutes.
pub const DEFAULT_MATCH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_secs(1);

/// Handle for the background match scheduler thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on `Drop`.
/// A pass already in flight runs to completion before the thread exits.
pub struct MatchSchedulerHandle {
    shutdown: Arc<AtomicBool>,
    passes: Arc<AtomicU64>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl MatchSchedulerHandle {
    /// Request shutdown. No new pass is started after this returns.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Request shutdown and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }

    /// Number of passes completed since start.
    pub fn passes_completed(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }
}

impl Drop for MatchSchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the match scheduler on a separate thread.
///
/// Returns `None`, leaving scheduled matching disabled, when the store
/// cannot be reached at startup.
pub fn start_match_scheduler(
    state: Arc<AppState>,
    interval: Duration,
) -> Option<MatchSchedulerHandle> {
    if !state.store_reachable() {
        tracing::warn!(
            path = %state.db_path().display(),
            "Store unreachable at startup, match scheduler disabled"
        );
        return None;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let passes = Arc::new(AtomicU64::new(0));
    let flag = shutdown.clone();
    let counter = passes.clone();

    let handle = std::thread::Builder::new()
        .name("match-scheduler".into())
        .spawn(move || {
            tracing::info!(
                interval_secs = interval.as_secs(),
                "Match scheduler started"
            );
            scheduler_loop(&state, interval, &flag, &counter);
        });

    match handle {
        Ok(handle) => Some(MatchSchedulerHandle {
            shutdown,
            passes,
            handle: Some(handle),
        }),
        Err(e) => {
            tracing::error!(error = %e, "Could not spawn match scheduler thread");
            None
        }
    }
}

fn scheduler_loop(state: &AppState, interval: Duration, shutdown: &AtomicBool, passes: &AtomicU64) {
    let granularity = interval.min(SLEEP_GRANULARITY);

    loop {
        let deadline = Instant::now() + interval;
        while Instant::now() < deadline {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!("Match scheduler shutting down");
                return;
            }
            std::thread::sleep(granularity);
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state.run_matching_blocking() {
            Ok(outcome) => {
                if outcome.is_aborted() {
                    tracing::warn!(errors = ?outcome.errors, "Scheduled matching pass aborted");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Scheduled matching pass could not run"),
        }
        passes.fetch_add(1, Ordering::Relaxed);
    }
    tracing::info!("Match scheduler shutting down");
}

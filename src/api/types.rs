//! Shared types for the admin API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::AdminRole;
use crate::state::AppState;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `AppState` plus API-specific caches.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Admin context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated admin, injected into request extensions by the auth
/// middleware after the bearer token has been matched.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub name: String,
    pub role: AdminRole,
}

// ═══════════════════════════════════════════════════════════
// Bearer tokens
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Issue a fresh token for an admin, replacing the previous one.
///
/// Only the hash is stored; the returned plaintext is shown once.
pub fn issue_admin_token(conn: &Connection, admin_id: &Uuid) -> Result<String, DatabaseError> {
    let token = generate_token();
    db::set_admin_token_hash(conn, admin_id, &hash_token(&token))?;
    Ok(token)
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-token sliding window
// ═══════════════════════════════════════════════════════════

/// Number of tracked callers above which stale entries are swept.
const SWEEP_THRESHOLD: usize = 1000;

/// Per-caller rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
    minute: Duration,
    hour: Duration,
    sweep_threshold: usize,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(100, 1000)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
            minute: Duration::from_secs(60),
            hour: Duration::from_secs(3600),
            sweep_threshold: SWEEP_THRESHOLD,
        }
    }

    /// Check if a caller is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        let now = Instant::now();

        if self.windows.len() > self.sweep_threshold {
            self.sweep(now);
        }

        let hour = self.hour;
        let minute = self.minute;
        let entries = self.windows.entry(key.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < hour);

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < minute)
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(minute.as_secs());
        }

        if entries.len() as u32 >= self.per_hour {
            return Err(hour.as_secs());
        }

        entries.push(now);
        Ok(())
    }

    /// Number of callers currently tracked.
    pub fn tracked_callers(&self) -> usize {
        self.windows.len()
    }

    /// Drop callers with no request inside the hourly window.
    fn sweep(&mut self, now: Instant) {
        let hour = self.hour;
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < hour);
            !entries.is_empty()
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
        assert_eq!(t1.len(), 43);
    }

    #[test]
    fn hash_token_is_deterministic() {
        assert_eq!(hash_token("test"), hash_token("test"));
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn issued_token_resolves_to_admin() {
        let conn = open_memory_database().unwrap();
        let admin = fixtures::admin(&conn, "issue@example.org");

        let token = issue_admin_token(&conn, &admin.id).unwrap();
        let found = db::find_admin_by_token_hash(&conn, &hash_token(&token))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, admin.id);
    }

    #[test]
    fn reissued_token_replaces_previous() {
        let conn = open_memory_database().unwrap();
        let admin = fixtures::admin(&conn, "rotate@example.org");

        let old = issue_admin_token(&conn, &admin.id).unwrap();
        let new = issue_admin_token(&conn, &admin.id).unwrap();
        assert!(db::find_admin_by_token_hash(&conn, &hash_token(&old))
            .unwrap()
            .is_none());
        assert!(db::find_admin_by_token_hash(&conn, &hash_token(&new))
            .unwrap()
            .is_some());
    }

    #[test]
    fn rate_limiter_allows_under_limit() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.check("admin-1").is_ok());
        assert!(limiter.check("admin-1").is_ok());
    }

    #[test]
    fn rate_limiter_rejects_over_per_minute() {
        let mut limiter = RateLimiter::with_limits(2, 1000);
        assert!(limiter.check("admin-1").is_ok());
        assert!(limiter.check("admin-1").is_ok());
        assert_eq!(limiter.check("admin-1"), Err(60));
    }

    #[test]
    fn rate_limiter_rejects_over_per_hour() {
        let mut limiter = RateLimiter::with_limits(100, 3);
        for _ in 0..3 {
            assert!(limiter.check("admin-1").is_ok());
        }
        assert_eq!(limiter.check("admin-1"), Err(3600));
    }

    #[test]
    fn rate_limiter_evicts_stale_callers() {
        let mut limiter = RateLimiter::with_limits(100, 1000);
        limiter.minute = Duration::from_millis(100);
        limiter.hour = Duration::from_millis(500);
        limiter.sweep_threshold = 50;

        for i in 0..200 {
            assert!(limiter.check(&format!("token:{i:016}")).is_ok());
        }
        assert_eq!(limiter.tracked_callers(), 200);

        std::thread::sleep(Duration::from_millis(600));
        assert!(limiter.check("token:fresh").is_ok());
        assert_eq!(limiter.tracked_callers(), 1);
    }

    #[test]
    fn rate_limiter_isolates_callers() {
        let mut limiter = RateLimiter::with_limits(1, 1000);
        assert!(limiter.check("admin-1").is_ok());
        assert!(limiter.check("admin-2").is_ok());
        assert_eq!(limiter.check("admin-1"), Err(60));
    }
}

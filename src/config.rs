use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

use crate::matching::DEFAULT_MATCH_INTERVAL;

/// Application-level constants
pub const APP_NAME: &str = "OrganLink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_BIND_ADDR: &str = "ORGANLINK_BIND_ADDR";
pub const ENV_DB_PATH: &str = "ORGANLINK_DB_PATH";
pub const ENV_MATCH_INTERVAL_SECS: &str = "ORGANLINK_MATCH_INTERVAL_SECS";
pub const ENV_SCHEDULER_ENABLED: &str = "ORGANLINK_SCHEDULER_ENABLED";

pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

/// Get the application data directory
/// ~/OrganLink/ on all platforms; falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from(".").join(APP_NAME),
    }
}

/// Default location of the SQLite store
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("organlink.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "organlink=info,organlink_lib=info,tower_http=warn"
}

/// Runtime settings for `organlink serve`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub match_interval: Duration,
    pub scheduler_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            db_path: default_db_path(),
            match_interval: DEFAULT_MATCH_INTERVAL,
            scheduler_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unset keys take their
    /// default; unparseable values take their default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, ENV_BIND_ADDR, defaults.bind_addr, |v| {
            v.parse::<SocketAddr>().ok()
        });
        let db_path = lookup(ENV_DB_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let match_interval = parse_or(&lookup, ENV_MATCH_INTERVAL_SECS, defaults.match_interval, |v| {
            v.parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        });
        let scheduler_enabled =
            parse_or(&lookup, ENV_SCHEDULER_ENABLED, defaults.scheduler_enabled, parse_bool);

        Self {
            bind_addr,
            db_path,
            match_interval,
            scheduler_enabled,
        }
    }
}

fn parse_or<T: std::fmt::Debug>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            tracing::warn!(key, value = %raw, default = ?default, "Invalid setting, using default");
            default
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

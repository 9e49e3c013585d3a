//! Repository layer: entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, one sub-module per
//! aggregate. Rows are read into plain string structs first and converted
//! to models outside the rusqlite closure so enum and id parsing errors
//! surface as `DatabaseError` rather than being swallowed.

mod admin;
mod organ_match;
mod profile;
mod request;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub use admin::*;
pub use organ_match::*;
pub use profile::*;
pub use request::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current UTC time truncated to the stored precision.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    parse_timestamp("now", &format_timestamp(&now)).unwrap_or(now)
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| DatabaseError::MalformedColumn {
            field: field.into(),
            value: raw.into(),
        })
}

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|_| DatabaseError::MalformedColumn {
        field: field.into(),
        value: raw.into(),
    })
}

//! Admin HTTP API.
//!
//! Exposes the matching trigger and admin workflows as JSON endpoints.
//! Admin routes are nested under `/api/admin/` and protected by a
//! middleware stack: Rate Limit → Auth → Audit → Handler.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::{issue_admin_token, ApiContext};

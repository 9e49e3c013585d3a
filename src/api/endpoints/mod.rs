//! API endpoint handlers.
//!
//! Each handler extracts `State<ApiContext>` and, on admin routes,
//! `Extension<AdminContext>` (injected by the auth middleware).

pub mod confirmation;
pub mod health;
pub mod matches;
pub mod matching;

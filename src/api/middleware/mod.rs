//! API middleware stack.
//!
//! Execution order on admin routes (outermost → innermost):
//! 1. Rate limiter: reject early, save resources
//! 2. Auth validator: bearer token lookup
//! 3. Audit logger: logs after auth, has admin_id

pub mod audit;
pub mod auth;
pub mod rate;

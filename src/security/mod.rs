//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-IP token bucket, 429 when exhausted)
//!     → limits.rs (body size, 413 when exceeded)
//!     → handler
//! Outgoing response:
//!     → headers.rs (security headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input; every relay field is re-derived and verified

pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use headers::apply_security_headers;
pub use limits::apply_body_limit;
pub use rate_limit::{rate_limit_middleware, RateLimiter};

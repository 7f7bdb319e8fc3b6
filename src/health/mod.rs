//! Relayer health subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe chain RPC and relayer balance
//!     → Update state.rs, metrics
//!
//! State (state.rs):
//!     Read by GET /health and the admin API
//! ```
//!
//! # Design Decisions
//! - Health never gates relaying; a request during an outage fails with
//!   its own retryable error
//! - Low funds degrade status before submissions start failing

pub mod active;
pub mod state;

pub use active::HealthMonitor;
pub use state::{HealthStatus, RelayerHealth};

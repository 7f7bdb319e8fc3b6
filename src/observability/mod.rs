//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request-scoped spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span of a request
//! - Private keys and signatures are never logged

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{init_metrics, RelayStats, RelayStatsSnapshot};

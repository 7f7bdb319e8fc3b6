//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Wallet → chain client → registry → verification → health monitor → listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain in-flight relays → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then chain, then listeners
//! - A relay already waiting for confirmation is allowed to finish

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, run, Bootstrapped, StartupError};

//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! [listener] tls present?
//!     → yes: tls.rs (load PEM cert/key) → axum-server rustls acceptor
//!     → no:  plain tokio TcpListener
//!     → Hand off to HTTP layer
//! ```

pub mod tls;

pub use tls::load_tls_config;

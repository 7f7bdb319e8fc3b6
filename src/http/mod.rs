//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, wire request → domain request)
//!     → handlers.rs (relay service, registry, health)
//!     → response.rs (JSON bodies, error → status mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RelayRequest, WireNonce, X_REQUEST_ID};
pub use response::{ErrorBody, HealthResponse, NonceResponse, RelayResponse};
pub use server::{AppState, RelayServer};

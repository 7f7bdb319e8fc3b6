//! Typed HTTP client for the ballot relay API.

mod client;

pub use client::{
    ApiError, HealthResponse, NonceResponse, RelayClient, RelayPayload, RelayResponse, SdkError,
};

//! Response bodies and error mapping.
//!
//! Every relay failure is rendered as
//! `{ "message": ..., "error": <kind>, "retryable": bool }` with a status
//! derived from its kind.

use alloy::primitives::{Address, TxHash, U256};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::relay::{ErrorKind, RelayError};

/// Success body of `POST /api/v1/relay`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub transaction_hash: TxHash,
}

/// Error body shared by every relay endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: ErrorKind,
    pub retryable: bool,
}

/// Body of `GET /api/v1/nonce/{position}/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponse {
    pub position: String,
    pub address: Address,
    /// Decimal string; uint256 does not fit a JSON number.
    pub nonce: String,
}

impl NonceResponse {
    pub fn new(position: String, address: Address, nonce: U256) -> Self {
        Self {
            position,
            address,
            nonce: nonce.to_string(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rpc_healthy: bool,
    pub relayer_address: Address,
    pub low_funds: bool,
}

impl RelayError {
    /// HTTP status reported for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidSignatureEncoding | ErrorKind::MalformedRequest => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::SignatureMismatch => StatusCode::UNAUTHORIZED,
            ErrorKind::UnknownPosition => StatusCode::NOT_FOUND,
            ErrorKind::StaleNonce => StatusCode::CONFLICT,
            ErrorKind::SubmissionReverted => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::InvalidContractState => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::NetworkFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::OracleUnavailable | ErrorKind::InsufficientRelayerFunds => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        Self {
            message: err.to_string(),
            error: err.kind(),
            retryable: err.is_retryable(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from(&self))).into_response()
    }
}

//! Relay failure taxonomy.

use alloy::primitives::{Address, U256};
use serde::Serialize;
use thiserror::Error;

/// Category of a relay failure, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidSignatureEncoding,
    SignatureMismatch,
    StaleNonce,
    UnknownPosition,
    MalformedRequest,
    OracleUnavailable,
    InvalidContractState,
    SubmissionReverted,
    NetworkFailure,
    InsufficientRelayerFunds,
}

impl ErrorKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidSignatureEncoding => "invalid_signature_encoding",
            ErrorKind::SignatureMismatch => "signature_mismatch",
            ErrorKind::StaleNonce => "stale_nonce",
            ErrorKind::UnknownPosition => "unknown_position",
            ErrorKind::MalformedRequest => "malformed_request",
            ErrorKind::OracleUnavailable => "oracle_unavailable",
            ErrorKind::InvalidContractState => "invalid_contract_state",
            ErrorKind::SubmissionReverted => "submission_reverted",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::InsufficientRelayerFunds => "insufficient_relayer_funds",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a meta-transaction was not relayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Signature components cannot form a recoverable ECDSA signature.
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    /// The signature recovers to someone other than the claimed sender.
    #[error("signature was not produced by {expected} (recovered {recovered})")]
    SignatureMismatch { expected: Address, recovered: Address },

    /// The nonce does not equal the contract's current counter.
    #[error("stale nonce: contract expects {expected}, request used {provided}; re-sign with the current nonce")]
    StaleNonce { expected: U256, provided: U256 },

    #[error("unknown position '{0}'")]
    UnknownPosition(String),

    /// A request field could not be parsed.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("nonce oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// The target contract answered, but not like an election contract.
    #[error("invalid contract state: {0}")]
    InvalidContractState(String),

    /// The contract rejected the transaction; carries the revert reason.
    #[error("{0}")]
    SubmissionReverted(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("relayer cannot pay for gas: {0}")]
    InsufficientRelayerFunds(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::InvalidSignatureEncoding(_) => ErrorKind::InvalidSignatureEncoding,
            RelayError::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            RelayError::StaleNonce { .. } => ErrorKind::StaleNonce,
            RelayError::UnknownPosition(_) => ErrorKind::UnknownPosition,
            RelayError::MalformedRequest(_) => ErrorKind::MalformedRequest,
            RelayError::OracleUnavailable(_) => ErrorKind::OracleUnavailable,
            RelayError::InvalidContractState(_) => ErrorKind::InvalidContractState,
            RelayError::SubmissionReverted(_) => ErrorKind::SubmissionReverted,
            RelayError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            RelayError::InsufficientRelayerFunds(_) => ErrorKind::InsufficientRelayerFunds,
        }
    }

    /// Whether resubmitting the identical request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::OracleUnavailable(_) | RelayError::NetworkFailure(_)
        )
    }

    /// Whether the request was rejected before anything reached the chain
    /// as a transaction.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidSignatureEncoding(_)
                | RelayError::SignatureMismatch { .. }
                | RelayError::StaleNonce { .. }
                | RelayError::UnknownPosition(_)
                | RelayError::MalformedRequest(_)
        )
    }
}

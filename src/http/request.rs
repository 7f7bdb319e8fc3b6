//! Request parsing and request IDs.
//!
//! # Responsibilities
//! - Deserialize the relay wire format
//! - Convert it into the relay's domain request, classifying parse failures
//! - Read the request ID assigned by the request-id layers
//!
//! # Design Decisions
//! - Hex and nonce fields are taken as strings and parsed here, so failures
//!   map to the relay error taxonomy instead of a generic JSON rejection
//! - Signature problems are `InvalidSignatureEncoding`; anything else
//!   unparseable is `MalformedRequest`

use alloy::hex;
use alloy::primitives::{Address, Bytes, U256};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::relay::{MetaTransactionRequest, RelayError, SignatureParts};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID of the current request, or `"unknown"` outside the layers.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Nonce as either a JSON integer or a decimal / 0x-hex string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireNonce {
    Int(u64),
    Str(String),
}

impl WireNonce {
    pub fn parse(&self) -> Result<U256, RelayError> {
        match self {
            WireNonce::Int(n) => Ok(U256::from(*n)),
            WireNonce::Str(s) => s
                .trim()
                .parse::<U256>()
                .map_err(|e| RelayError::MalformedRequest(format!("nonce '{}': {}", s, e))),
        }
    }
}

/// Body of `POST /api/v1/relay`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub from: String,
    pub function_signature: String,
    pub nonce: WireNonce,
    pub r: String,
    pub s: String,
    /// Signed so a negative `v` reaches the signature checks.
    pub v: i64,
    pub position: String,
}

impl RelayRequest {
    /// Parse every field into the relay's domain request.
    pub fn into_domain(self) -> Result<MetaTransactionRequest, RelayError> {
        let from = parse_address("from", &self.from)?;
        let payload = Bytes::from(decode_hex("functionSignature", &self.function_signature)?);
        if payload.is_empty() {
            return Err(RelayError::MalformedRequest(
                "functionSignature must not be empty".to_string(),
            ));
        }
        let nonce = self.nonce.parse()?;

        let r = decode_signature_hex("r", &self.r)?;
        let s = decode_signature_hex("s", &self.s)?;
        let v = u8::try_from(self.v).map_err(|_| {
            RelayError::InvalidSignatureEncoding(format!("v out of range: {}", self.v))
        })?;
        let signature = SignatureParts::parse(&r, &s, v)?;

        Ok(MetaTransactionRequest {
            position: self.position,
            from,
            payload,
            nonce,
            signature,
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, RelayError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| RelayError::MalformedRequest(format!("{} is not an address: '{}'", field, value)))
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, RelayError> {
    hex::decode(value.trim())
        .map_err(|e| RelayError::MalformedRequest(format!("{} is not valid hex: {}", field, e)))
}

fn decode_signature_hex(field: &str, value: &str) -> Result<Vec<u8>, RelayError> {
    hex::decode(value.trim()).map_err(|e| {
        RelayError::InvalidSignatureEncoding(format!("{} is not valid hex: {}", field, e))
    })
}

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed meta-transaction as sent to `POST /api/v1/relay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPayload {
    pub from: String,
    pub function_signature: String,
    /// Decimal or 0x-hex; uint256 does not fit a JSON number.
    pub nonce: String,
    pub r: String,
    pub s: String,
    pub v: u8,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponse {
    pub position: String,
    pub address: String,
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rpc_healthy: bool,
    pub relayer_address: String,
    pub low_funds: bool,
}

/// Error body returned by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    /// Failure kind, e.g. `StaleNonce`.
    pub error: String,
    pub retryable: bool,
}

#[derive(Debug)]
pub enum SdkError {
    /// The request never got a response.
    Http(reqwest::Error),
    /// The relay answered with an error status.
    Api { status: u16, body: ApiError },
    /// The relay answered with something other than the expected body.
    Decode { status: u16, text: String },
}

impl SdkError {
    /// The relay's failure kind, when it sent one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            SdkError::Api { body, .. } => Some(&body.error),
            _ => None,
        }
    }

    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Http(_) => true,
            SdkError::Api { body, .. } => body.retryable,
            SdkError::Decode { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdkError::Http(e) => write!(f, "HTTP error: {}", e),
            SdkError::Api { status, body } => {
                write!(f, "relay returned {} ({}): {}", status, body.error, body.message)
            }
            SdkError::Decode { status, text } => {
                write!(f, "unexpected response ({}): {}", status, text)
            }
        }
    }
}

impl std::error::Error for SdkError {}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Http(e)
    }
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a signed meta-transaction; resolves once it is confirmed.
    pub async fn relay(&self, payload: &RelayPayload) -> Result<RelayResponse, SdkError> {
        let resp = self
            .client
            .post(format!("{}/api/v1/relay", self.relay_url))
            .json(payload)
            .send()
            .await?;
        decode(resp).await
    }

    /// Registered positions and their contract addresses.
    pub async fn positions(&self) -> Result<BTreeMap<String, String>, SdkError> {
        let resp = self
            .client
            .get(format!("{}/api/v1/positions", self.relay_url))
            .send()
            .await?;
        decode(resp).await
    }

    /// Nonce `address` must sign with for `position`.
    pub async fn nonce(&self, position: &str, address: &str) -> Result<NonceResponse, SdkError> {
        let resp = self
            .client
            .get(format!("{}/api/v1/nonce/{}/{}", self.relay_url, position, address))
            .send()
            .await?;
        decode(resp).await
    }

    /// Relay health; an unavailable relay still returns its body.
    pub async fn health(&self) -> Result<HealthResponse, SdkError> {
        let resp = self
            .client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|_| SdkError::Decode { status, text })
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ApiError>(&text) {
            Ok(body) => SdkError::Api {
                status: status.as_u16(),
                body,
            },
            Err(_) => SdkError::Decode {
                status: status.as_u16(),
                text,
            },
        });
    }

    serde_json::from_str(&text).map_err(|_| SdkError::Decode {
        status: status.as_u16(),
        text,
    })
}

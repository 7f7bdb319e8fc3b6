//! Relay API handlers.

use alloy::primitives::Address;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::health::HealthStatus;
use crate::http::request::{request_id, RelayRequest};
use crate::http::response::{HealthResponse, NonceResponse, RelayResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::RelayError;

/// `POST /api/v1/relay`
pub async fn relay(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return rejection.into_response();
        }
        Err(rejection) => {
            tracing::debug!(request_id = %request_id, error = %rejection.body_text(), "Unparseable relay body");
            return finish(&state, start, Err(RelayError::MalformedRequest(rejection.body_text())));
        }
    };

    let result = match body.into_domain() {
        Ok(request) => state.service.relay(request).await,
        Err(e) => Err(e),
    };
    finish(&state, start, result.map(|receipt| receipt.transaction_hash))
}

fn finish(
    state: &AppState,
    start: Instant,
    result: Result<alloy::primitives::TxHash, RelayError>,
) -> Response {
    let outcome = metrics::outcome_label(&result.as_ref().map(|_| ()));
    metrics::record_relay(outcome, start);
    state.stats.record(result.as_ref().map(|_| ()));

    match result {
        Ok(transaction_hash) => Json(RelayResponse { transaction_hash }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /api/v1/positions`
pub async fn positions(State(state): State<AppState>) -> Json<BTreeMap<String, Address>> {
    Json(
        state
            .service
            .registry()
            .iter()
            .map(|(key, address)| (key.to_string(), address))
            .collect(),
    )
}

/// `GET /api/v1/nonce/{position}/{address}`
pub async fn nonce(
    State(state): State<AppState>,
    Path((position, address)): Path<(String, String)>,
) -> Result<Json<NonceResponse>, RelayError> {
    let address: Address = address
        .parse()
        .map_err(|_| RelayError::MalformedRequest(format!("'{}' is not an address", address)))?;
    let nonce = state.service.nonce_for(&position, address).await?;
    Ok(Json(NonceResponse::new(position, address, nonce)))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = state.health.status();
    let code = match status {
        HealthStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Ok | HealthStatus::Degraded => StatusCode::OK,
    };
    (
        code,
        Json(HealthResponse {
            status: status.as_str(),
            rpc_healthy: state.health.rpc_healthy(),
            relayer_address: state.health.relayer(),
            low_funds: state.health.low_funds(),
        }),
    )
}

use alloy::primitives::Address;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::observability::RelayStatsSnapshot;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub positions: usize,
    pub requests: RelayStatsSnapshot,
}

#[derive(Serialize)]
pub struct RelayerStatus {
    pub address: Address,
    pub chain_id: u64,
    pub rpc_healthy: bool,
    /// Decimal wei; `None` until the first health check completes.
    pub balance_wei: Option<String>,
    pub low_balance_threshold_wei: String,
    pub low_funds: bool,
    pub last_check_unix: Option<u64>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: state.health.status().as_str(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        positions: state.service.registry().len(),
        requests: state.stats.snapshot(),
    })
}

pub async fn get_relayer(State(state): State<AppState>) -> Json<RelayerStatus> {
    let health = &state.health;
    Json(RelayerStatus {
        address: health.relayer(),
        chain_id: state.chain_id,
        rpc_healthy: health.rpc_healthy(),
        balance_wei: health.balance_wei().map(|b| b.to_string()),
        low_balance_threshold_wei: state.low_balance_wei.to_string(),
        low_funds: health.low_funds(),
        last_check_unix: health.last_check(),
    })
}

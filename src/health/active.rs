//! Active relayer health checking.
//!
//! # Responsibilities
//! - Periodically probe the chain RPC
//! - Track the relayer balance against the low-funds threshold
//! - Publish both to `RelayerHealth` and to metrics

use alloy::primitives::U256;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::blockchain::BlockchainClient;
use crate::config::HealthConfig;
use crate::health::state::RelayerHealth;
use crate::observability::metrics;

pub struct HealthMonitor {
    client: BlockchainClient,
    health: Arc<RelayerHealth>,
    config: HealthConfig,
    low_balance_wei: U256,
}

impl HealthMonitor {
    pub fn new(client: BlockchainClient, health: Arc<RelayerHealth>, config: HealthConfig) -> Self {
        let low_balance_wei = U256::from(client.config().low_balance_wei);
        Self {
            client,
            health,
            config,
            low_balance_wei,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Relayer health monitor disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            relayer = %self.health.relayer(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one probe of RPC reachability and relayer balance.
    pub async fn check_once(&self) {
        match self.client.get_balance(self.health.relayer()).await {
            Ok(balance) => {
                self.health.set_rpc_healthy(true);
                self.health.set_balance(balance, self.low_balance_wei);
                let wei = u128::try_from(balance).map(|b| b as f64).unwrap_or(f64::MAX);
                metrics::record_relayer_balance(wei);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed: balance query");
                self.health.set_rpc_healthy(self.client.is_healthy().await);
            }
        }
        metrics::record_rpc_health(self.health.rpc_healthy());
    }
}

//! Startup orchestration.
//!
//! # Order
//! 1. metrics exporter
//! 2. relayer wallet from the environment
//! 3. chain client (chain ID mismatch is logged, not fatal)
//! 4. contract registry, then optional deployment verification
//! 5. health monitor, signal handler
//! 6. listener, last, so traffic only arrives once everything is ready
//!
//! Any failure before the listener binds is fatal.

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::blockchain::{BlockchainClient, BlockchainError, TxBuilder, Wallet};
use crate::config::RelayConfig;
use crate::health::{HealthMonitor, RelayerHealth};
use crate::http::{AppState, RelayServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::net::load_tls_config;
use crate::observability::init_metrics;
use crate::registry::{load_registry, verify_deployments, RegistryError};
use crate::relay::{ChainNonceOracle, ChainSubmitter, RelayService};

/// Fatal startup or serving failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("relayer wallet: {0}")]
    Wallet(#[source] BlockchainError),

    #[error("chain client: {0}")]
    Chain(#[source] BlockchainError),

    #[error("contract registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("metrics exporter: {0}")]
    Metrics(String),

    #[error("TLS: {0}")]
    Tls(#[source] std::io::Error),

    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything the server needs, wired together.
pub struct Bootstrapped {
    pub state: AppState,
    pub client: BlockchainClient,
    pub health: Arc<RelayerHealth>,
}

/// Build the relay's components from `config`.
pub async fn bootstrap(config: &RelayConfig) -> Result<Bootstrapped, StartupError> {
    let wallet = Wallet::from_env(&config.relayer.private_key_env, config.chain.chain_id)
        .map_err(StartupError::Wallet)?;
    tracing::info!(relayer = %wallet.address(), "Relayer wallet loaded");

    let client = BlockchainClient::new(config.chain.clone())
        .await
        .map_err(StartupError::Chain)?;

    let tx_builder = TxBuilder::new(client.clone(), wallet.clone());
    if let Err(e) = tx_builder.sync_nonce().await {
        tracing::warn!(error = %e, "Could not read relayer account nonce; it is read again before the first submission");
    }

    let registry = load_registry(&config.registry)?;
    let oracle = Arc::new(ChainNonceOracle::new(client.clone()));

    if config.registry.verify_on_startup {
        verify_deployments(&registry, &client, oracle.as_ref()).await?;
    } else {
        tracing::warn!("Deployment verification disabled");
    }

    let submitter = Arc::new(ChainSubmitter::new(
        tx_builder,
        config.chain.confirmation_timeout_secs,
    ));
    let service = RelayService::new(Arc::new(registry), oracle, submitter);

    let health = Arc::new(RelayerHealth::new(wallet.address()));
    let state = AppState::new(service, health.clone(), config);

    Ok(Bootstrapped {
        state,
        client,
        health,
    })
}

/// Start the relay and serve until a termination signal.
pub async fn run(config: RelayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e| StartupError::Metrics(format!("{}: {}", config.observability.metrics_address, e)))?;
        init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let Bootstrapped {
        state,
        client,
        health,
    } = bootstrap(&config).await?;

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let monitor = HealthMonitor::new(client, health, config.health.clone());
    tokio::spawn(monitor.run(shutdown.subscribe()));

    let server = RelayServer::new(&config, state);
    let address = config.listener.bind_address.clone();

    let result = match &config.listener.tls {
        Some(tls) => {
            let tls_config = load_tls_config(tls).await.map_err(StartupError::Tls)?;
            let addr: SocketAddr = address.parse().map_err(|e| StartupError::Bind {
                address: address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;
            server.run_tls(addr, tls_config, shutdown.signaled()).await
        }
        None => {
            let listener = TcpListener::bind(&address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: address.clone(),
                    source,
                })?;
            server.run(listener, shutdown.signaled()).await
        }
    };

    // Stops background tasks when the server exits on its own.
    shutdown.trigger();
    result.map_err(StartupError::Serve)
}

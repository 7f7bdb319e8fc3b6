//! Shared utilities for integration and failure-injection testing.

#![allow(dead_code)]

use alloy::hex;
use alloy::primitives::{keccak256, Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use ballot_relay::blockchain::IElectionPosition;
use ballot_relay::config::RelayConfig;
use ballot_relay::health::RelayerHealth;
use ballot_relay::http::{AppState, RelayServer};
use ballot_relay::registry::ContractRegistry;
use ballot_relay::relay::codec::sign_meta_transaction;
use ballot_relay::relay::{MetaTxSubmitter, NonceOracle, RelayError, RelayService, VerifiedMetaTransaction};
use relay_sdk::RelayPayload;

/// Anvil account #1.
pub const VOTER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
/// Anvil account #2.
pub const OTHER_VOTER_KEY: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

pub const PRESIDENT: Address = Address::new([0xcc; 20]);
pub const TREASURER: Address = Address::new([0xdd; 20]);
pub const RELAYER: Address = Address::new([0x01; 20]);

pub fn voter() -> PrivateKeySigner {
    VOTER_KEY.parse().unwrap()
}

pub fn other_voter() -> PrivateKeySigner {
    OTHER_VOTER_KEY.parse().unwrap()
}

/// In-process election chain: one nonce table read by the oracle side and
/// advanced by the submitter side, with injectable faults.
pub struct MockChain {
    nonces: Mutex<HashMap<(Address, Address), U256>>,
    oracle_delay: Duration,
    oracle_timeout: Duration,
    submit_delay: Duration,
    submit_failure: Option<RelayError>,
    oracle_calls: AtomicUsize,
    submissions: AtomicUsize,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            nonces: Mutex::new(HashMap::new()),
            oracle_delay: Duration::ZERO,
            oracle_timeout: Duration::from_secs(2),
            submit_delay: Duration::ZERO,
            submit_failure: None,
            oracle_calls: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nonce(self, contract: Address, signer: Address, nonce: u64) -> Self {
        self.nonces
            .lock()
            .unwrap()
            .insert((contract, signer), U256::from(nonce));
        self
    }

    /// Nonce reads take `delay`; reads slower than the oracle timeout fail.
    pub fn with_oracle_delay(mut self, delay: Duration, timeout: Duration) -> Self {
        self.oracle_delay = delay;
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn failing_submissions(mut self, error: RelayError) -> Self {
        self.submit_failure = Some(error);
        self
    }

    pub fn nonce(&self, contract: Address, signer: Address) -> U256 {
        self.nonces
            .lock()
            .unwrap()
            .get(&(contract, signer))
            .copied()
            .unwrap_or_default()
    }

    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NonceOracle for MockChain {
    async fn current_nonce(&self, contract: Address, signer: Address) -> Result<U256, RelayError> {
        self.oracle_calls.fetch_add(1, Ordering::SeqCst);
        if tokio::time::timeout(self.oracle_timeout, tokio::time::sleep(self.oracle_delay))
            .await
            .is_err()
        {
            return Err(RelayError::OracleUnavailable(format!(
                "RPC timeout after {} ms",
                self.oracle_timeout.as_millis()
            )));
        }
        Ok(self.nonce(contract, signer))
    }
}

#[async_trait]
impl MetaTxSubmitter for MockChain {
    async fn submit(
        &self,
        target: Address,
        meta_tx: &VerifiedMetaTransaction,
    ) -> Result<TxHash, RelayError> {
        tokio::time::sleep(self.submit_delay).await;
        if let Some(error) = &self.submit_failure {
            return Err(error.clone());
        }

        let mut nonces = self.nonces.lock().unwrap();
        let current = nonces.entry((target, meta_tx.signer())).or_default();
        if *current != meta_tx.nonce() {
            return Err(RelayError::SubmissionReverted(
                "Signer and signature do not match".into(),
            ));
        }
        *current += U256::from(1);
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(keccak256([target.as_slice(), &current.to_be_bytes::<32>()].concat()))
    }
}

/// Config for in-process servers: no metrics exporter, no rate limiting.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.metrics_enabled = false;
    config.rate_limit.enabled = false;
    config
}

/// Serve the relay API over `chain` on an ephemeral port.
pub async fn spawn_server(config: RelayConfig, chain: Arc<MockChain>) -> SocketAddr {
    let (addr, _) = spawn_server_with_health(config, chain).await;
    addr
}

pub async fn spawn_server_with_health(
    config: RelayConfig,
    chain: Arc<MockChain>,
) -> (SocketAddr, Arc<RelayerHealth>) {
    let mut positions = BTreeMap::new();
    positions.insert("president".to_string(), PRESIDENT);
    positions.insert("treasurer".to_string(), TREASURER);
    let registry = Arc::new(ContractRegistry::new(positions).unwrap());

    let service = RelayService::new(registry, chain.clone(), chain);
    let health = Arc::new(RelayerHealth::new(RELAYER));
    let state = AppState::new(service, health.clone(), &config);
    let server = RelayServer::new(&config, state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, std::future::pending()).await;
    });

    (addr, health)
}

pub fn vote_payload(candidate: u64) -> Vec<u8> {
    IElectionPosition::voteCall { candidateId: U256::from(candidate) }.abi_encode()
}

/// A vote for `candidate` signed by `signer` the way a voter's wallet does.
pub async fn signed_vote(
    signer: &PrivateKeySigner,
    position: &str,
    target: Address,
    nonce: u64,
    candidate: u64,
) -> RelayPayload {
    let payload = vote_payload(candidate);
    let signature = sign_meta_transaction(signer, target, &payload, U256::from(nonce))
        .await
        .unwrap();
    RelayPayload {
        from: signer.address().to_string(),
        function_signature: hex::encode_prefixed(&payload),
        nonce: nonce.to_string(),
        r: signature.r.to_string(),
        s: signature.s.to_string(),
        v: signature.v,
        position: position.to_string(),
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

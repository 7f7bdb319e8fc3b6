//! Relayer wallet: the funded credential that pays gas for voters.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - The wallet is an explicit value handed to the submitter at
//!   construction; there is no process-wide signer

use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Wallet for transaction signing with account nonce management.
///
/// The account nonce tracked here sequences the relayer's own transactions.
/// It is unrelated to the per-voter meta-transaction nonce held by the
/// election contracts.
#[derive(Debug)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Network wallet wrapping the same key, used to sign transactions.
    network_wallet: EthereumWallet,
    /// Next account nonce to use.
    nonce: Arc<AtomicU64>,
    /// Whether `nonce` has been read from the chain at least once.
    nonce_synced: Arc<AtomicBool>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Accepts the key with or without `0x` prefix. The key is never logged.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self {
            network_wallet: EthereumWallet::from(signer.clone()),
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
            nonce_synced: Arc::new(AtomicBool::new(false)),
            chain_id,
        })
    }

    /// Load wallet from the named environment variable.
    pub fn from_env(var_name: &str, chain_id: u64) -> BlockchainResult<Self> {
        let private_key = std::env::var(var_name).map_err(|_| {
            BlockchainError::Wallet(format!("Environment variable {} not set", var_name))
        })?;

        Self::from_private_key(&private_key, chain_id)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get and increment the nonce atomically.
    ///
    /// Concurrent submissions each receive a distinct nonce.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Set the nonce to a specific value (e.g., after querying from chain).
    ///
    /// Marks the nonce as synchronized.
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
        self.nonce_synced.store(true, Ordering::SeqCst);
    }

    /// False until the first `set_nonce`; an unsynced nonce is only a
    /// placeholder and must not be handed out.
    pub fn is_nonce_synced(&self) -> bool {
        self.nonce_synced.load(Ordering::SeqCst)
    }

    /// Get current nonce without incrementing.
    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Sign a fully populated transaction request.
    ///
    /// Returns the EIP-2718 encoded bytes ready for `eth_sendRawTransaction`.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> BlockchainResult<Bytes> {
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &self.network_wallet)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Transaction signing failed: {}", e)))?;
        Ok(envelope.encoded_2718().into())
    }
}

impl Clone for Wallet {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            network_wallet: self.network_wallet.clone(),
            nonce: self.nonce.clone(),
            nonce_synced: self.nonce_synced.clone(),
            chain_id: self.chain_id,
        }
    }
}

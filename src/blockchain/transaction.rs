//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build transactions with gas estimation and a gas price ceiling
//! - Refuse to broadcast what the relayer cannot pay for
//! - Sign and broadcast transactions
//! - Monitor confirmations, replaying reverted transactions for their reason

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;

/// Transaction builder bound to the relayer wallet.
#[derive(Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
    /// Serializes the lazy first read of the account nonce.
    nonce_sync: Arc<Mutex<()>>,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self {
            client,
            wallet,
            nonce_sync: Arc::new(Mutex::new(())),
        }
    }

    /// Seed the wallet's account nonce from the chain's pending count.
    pub async fn sync_nonce(&self) -> BlockchainResult<u64> {
        let chain_nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        self.wallet.set_nonce(chain_nonce);
        tracing::debug!(address = %self.wallet.address(), nonce = chain_nonce, "Relayer nonce synchronized");
        Ok(chain_nonce)
    }

    /// Read the account nonce from the chain unless that already happened.
    async fn ensure_nonce_synced(&self) -> BlockchainResult<()> {
        if self.wallet.is_nonce_synced() {
            return Ok(());
        }
        let _guard = self.nonce_sync.lock().await;
        if !self.wallet.is_nonce_synced() {
            self.sync_nonce().await?;
        }
        Ok(())
    }

    /// Build a call transaction to `to` with `data`.
    ///
    /// Gas is estimated against the current chain state, so a call that
    /// would revert fails here with `Reverted` before anything is signed.
    pub async fn build(&self, to: Address, data: Bytes) -> BlockchainResult<TransactionRequest> {
        let config = self.client.config();

        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }
        let adjusted_gas_price = (gas_price as f64 * config.gas_price_multiplier) as u128;

        let estimate_request = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(to)
            .with_input(data.clone());
        let estimate = self.client.estimate_gas(estimate_request).await?;
        let gas_limit = (estimate as f64 * config.gas_limit_multiplier).ceil() as u64;

        let required = U256::from(gas_limit) * U256::from(adjusted_gas_price);
        let balance = self.client.get_balance(self.wallet.address()).await?;
        if balance < required {
            return Err(BlockchainError::InsufficientFunds(format!(
                "relayer {} holds {} wei, transaction needs up to {} wei",
                self.wallet.address(),
                balance,
                required
            )));
        }

        self.ensure_nonce_synced().await?;
        let nonce = self.wallet.get_and_increment_nonce();

        Ok(TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(to)
            .with_value(U256::ZERO)
            .with_input(data)
            .with_nonce(nonce)
            .with_gas_price(adjusted_gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(gas_limit))
    }

    /// Sign and broadcast a built transaction.
    ///
    /// A failed broadcast leaves a gap in the account nonce sequence, so the
    /// wallet is resynchronized from the chain before the error is returned.
    pub async fn send(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let raw = self.wallet.sign_transaction(tx).await?;

        match self.client.send_raw_transaction(raw).await {
            Ok(hash) => {
                tracing::info!(tx_hash = %hash, "Transaction broadcast");
                Ok(hash)
            }
            Err(e) => {
                if let Err(sync_err) = self.sync_nonce().await {
                    tracing::warn!(error = %sync_err, "Failed to resynchronize relayer nonce");
                }
                Err(e)
            }
        }
    }

    /// Wait for a transaction built from `tx` to be confirmed.
    ///
    /// A transaction included in block N has `head - N + 1` confirmations.
    /// A mined transaction with a failed status is replayed as an `eth_call`
    /// at its block so `Failed` carries the contract's revert reason.
    pub async fn wait_for_confirmation(
        &self,
        tx: &TransactionRequest,
        tx_hash: TxHash,
        timeout_secs: u64,
    ) -> BlockchainResult<ConfirmationStatus> {
        let required_confirmations = self.client.confirmation_blocks().max(1) as u64;
        let timeout_duration = Duration::from_secs(timeout_secs);
        let poll_interval = Duration::from_millis(self.client.config().poll_interval_ms);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);

                if !receipt.status() {
                    let reason = self.replay_revert_reason(tx, tx_block).await.unwrap_or_else(|| {
                        format!("transaction {} reverted in block {}", tx_hash, tx_block)
                    });
                    tracing::warn!(tx_hash = %tx_hash, block = tx_block, reason = %reason, "Transaction reverted");
                    return Ok(ConfirmationStatus::Failed(reason));
                }

                let confirmations = current_block.saturating_sub(tx_block) + 1;
                if confirmations >= required_confirmations {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(timeout_secs)),
        }
    }

    /// Re-run `tx` against the state at `block` and decode why it reverts.
    async fn replay_revert_reason(&self, tx: &TransactionRequest, block: u64) -> Option<String> {
        let replay = TransactionRequest {
            from: tx.from,
            to: tx.to,
            input: tx.input.clone(),
            gas: tx.gas,
            ..TransactionRequest::default()
        };
        match self.client.call_at(replay, block).await {
            Err(BlockchainError::Reverted(reason)) => Some(reason),
            Err(e) => {
                tracing::debug!(error = %e, "Revert replay failed");
                None
            }
            // Later transactions in the block moved the state on.
            Ok(_) => None,
        }
    }

    /// Get the relayer address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

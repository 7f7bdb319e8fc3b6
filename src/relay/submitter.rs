//! Relay submitter: forwards verified meta-transactions on-chain.
//!
//! The relayer wallet signs and pays for an `executeMetaTransaction` call on
//! the target contract, then waits for the configured confirmation depth.

use alloy::primitives::{Address, TxHash};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::blockchain::{BlockchainError, ConfirmationStatus, IElectionPosition, TxBuilder};
use crate::relay::error::RelayError;
use crate::relay::types::VerifiedMetaTransaction;

/// Submits verified meta-transactions and reports the confirmed hash.
#[async_trait]
pub trait MetaTxSubmitter: Send + Sync {
    async fn submit(
        &self,
        target: Address,
        meta_tx: &VerifiedMetaTransaction,
    ) -> Result<TxHash, RelayError>;
}

/// Submitter that signs with the relayer wallet and broadcasts over RPC.
#[derive(Clone)]
pub struct ChainSubmitter {
    tx_builder: TxBuilder,
    confirmation_timeout_secs: u64,
}

impl ChainSubmitter {
    pub fn new(tx_builder: TxBuilder, confirmation_timeout_secs: u64) -> Self {
        Self {
            tx_builder,
            confirmation_timeout_secs,
        }
    }

    pub fn relayer_address(&self) -> Address {
        self.tx_builder.address()
    }
}

/// ABI-encode the `executeMetaTransaction` call for `meta_tx`.
pub fn encode_execute_call(meta_tx: &VerifiedMetaTransaction) -> Vec<u8> {
    let signature = meta_tx.signature();
    IElectionPosition::executeMetaTransactionCall {
        userAddress: meta_tx.signer(),
        functionSignature: meta_tx.payload().clone(),
        sigR: signature.r,
        sigS: signature.s,
        sigV: signature.v,
    }
    .abi_encode()
}

#[async_trait]
impl MetaTxSubmitter for ChainSubmitter {
    async fn submit(
        &self,
        target: Address,
        meta_tx: &VerifiedMetaTransaction,
    ) -> Result<TxHash, RelayError> {
        let data = encode_execute_call(meta_tx);

        let tx = self
            .tx_builder
            .build(target, data.into())
            .await
            .map_err(submission_error)?;
        let tx_hash = self.tx_builder.send(tx.clone()).await.map_err(submission_error)?;

        match self
            .tx_builder
            .wait_for_confirmation(&tx, tx_hash, self.confirmation_timeout_secs)
            .await
            .map_err(|e| match e {
                BlockchainError::ConfirmationTimeout(secs) => RelayError::NetworkFailure(format!(
                    "transaction {} not confirmed within {} seconds",
                    tx_hash, secs
                )),
                other => submission_error(other),
            })?
        {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(tx_hash = %tx_hash, block_number, "Meta-transaction confirmed");
                Ok(tx_hash)
            }
            ConfirmationStatus::Failed(reason) => Err(RelayError::SubmissionReverted(reason)),
        }
    }
}

/// Map a chain-layer failure onto the relay taxonomy.
fn submission_error(err: BlockchainError) -> RelayError {
    match err {
        BlockchainError::Reverted(reason) => RelayError::SubmissionReverted(reason),
        BlockchainError::InsufficientFunds(detail) => RelayError::InsufficientRelayerFunds(detail),
        other => RelayError::NetworkFailure(other.to_string()),
    }
}

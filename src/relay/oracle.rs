//! Nonce oracle: reads a signer's replay counter from the target contract.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::blockchain::{BlockchainClient, BlockchainError, IElectionPosition};
use crate::relay::error::RelayError;

/// Source of truth for a signer's current meta-transaction nonce.
#[async_trait]
pub trait NonceOracle: Send + Sync {
    /// The nonce the contract expects on `signer`'s next meta-transaction.
    ///
    /// Transport failures and timeouts are `OracleUnavailable`; a contract
    /// that answers but not with a nonce is `InvalidContractState`.
    async fn current_nonce(&self, contract: Address, signer: Address) -> Result<U256, RelayError>;
}

/// Oracle backed by `getNonce(address)` over JSON-RPC.
#[derive(Debug, Clone)]
pub struct ChainNonceOracle {
    client: BlockchainClient,
}

impl ChainNonceOracle {
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NonceOracle for ChainNonceOracle {
    async fn current_nonce(&self, contract: Address, signer: Address) -> Result<U256, RelayError> {
        let call = IElectionPosition::getNonceCall { user: signer };
        let request = TransactionRequest::default()
            .with_to(contract)
            .with_input(call.abi_encode());

        let output = self.client.call(request).await.map_err(|e| match e {
            BlockchainError::Reverted(reason) => RelayError::InvalidContractState(format!(
                "getNonce reverted on {}: {}",
                contract, reason
            )),
            other => RelayError::OracleUnavailable(other.to_string()),
        })?;

        IElectionPosition::getNonceCall::abi_decode_returns(&output).map_err(|e| {
            RelayError::InvalidContractState(format!(
                "{} did not return a nonce ({} bytes): {}",
                contract,
                output.len(),
                e
            ))
        })
    }
}

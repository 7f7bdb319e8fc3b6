//! Relay orchestration.
//!
//! Resolves the position, verifies, submits. Holds no per-request state;
//! the on-chain nonce is what makes a second identical request fail.

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use crate::observability::metrics;
use crate::registry::ContractRegistry;
use crate::relay::error::RelayError;
use crate::relay::oracle::NonceOracle;
use crate::relay::submitter::MetaTxSubmitter;
use crate::relay::types::{MetaTransactionRequest, RelayReceipt, RelayStage};
use crate::relay::verifier::MetaTxVerifier;

/// Tracks and logs one request's stage transitions.
struct StageTracker {
    stage: RelayStage,
}

impl StageTracker {
    fn new() -> Self {
        tracing::debug!(stage = %RelayStage::Received, "Relay stage");
        Self {
            stage: RelayStage::Received,
        }
    }

    fn advance(&mut self, next: RelayStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal relay stage transition {} -> {}",
            self.stage,
            next
        );
        tracing::debug!(from = %self.stage, stage = %next, "Relay stage");
        self.stage = next;
    }

    /// Terminal stage for a failure raised while in the current stage.
    fn fail(&mut self, err: &RelayError) {
        let next = match (self.stage, err) {
            (RelayStage::Submitting, RelayError::SubmissionReverted(_)) => RelayStage::Reverted,
            (RelayStage::Submitting, RelayError::InsufficientRelayerFunds(_)) => RelayStage::Unfunded,
            (RelayStage::Submitting, _) => RelayStage::NetworkFailure,
            _ => RelayStage::Rejected,
        };
        self.advance(next);
    }
}

/// Entry point for relaying a voter's meta-transaction.
#[derive(Clone)]
pub struct RelayService {
    registry: Arc<ContractRegistry>,
    oracle: Arc<dyn NonceOracle>,
    verifier: MetaTxVerifier,
    submitter: Arc<dyn MetaTxSubmitter>,
}

impl RelayService {
    pub fn new(
        registry: Arc<ContractRegistry>,
        oracle: Arc<dyn NonceOracle>,
        submitter: Arc<dyn MetaTxSubmitter>,
    ) -> Self {
        Self {
            registry,
            verifier: MetaTxVerifier::new(oracle.clone()),
            oracle,
            submitter,
        }
    }

    /// Relay `request`, returning the confirmed transaction hash.
    #[tracing::instrument(
        name = "relay",
        skip_all,
        fields(position = %request.position, from = %request.from, nonce = %request.nonce)
    )]
    pub async fn relay(&self, request: MetaTransactionRequest) -> Result<RelayReceipt, RelayError> {
        let mut tracker = StageTracker::new();

        let target = match self.registry.resolve(&request.position) {
            Ok(target) => target,
            Err(e) => {
                tracker.fail(&e);
                return Err(e);
            }
        };

        let position = request.position.clone();
        tracker.advance(RelayStage::Verifying);
        let verified = match self.verifier.verify(request.into_meta_transaction(target)).await {
            Ok(verified) => verified,
            Err(e) => {
                tracing::info!(error = %e, kind = %e.kind(), "Meta-transaction rejected");
                tracker.fail(&e);
                return Err(e);
            }
        };
        tracker.advance(RelayStage::Verified);

        tracker.advance(RelayStage::Submitting);
        match self.submitter.submit(target, &verified).await {
            Ok(transaction_hash) => {
                tracker.advance(RelayStage::Confirmed);
                tracing::info!(tx_hash = %transaction_hash, target = %target, "Meta-transaction relayed");
                Ok(RelayReceipt {
                    transaction_hash,
                    position,
                    from: verified.signer(),
                    nonce: verified.nonce(),
                })
            }
            Err(e) => {
                if let RelayError::InsufficientRelayerFunds(detail) = &e {
                    tracing::error!(detail = %detail, "Relayer cannot pay for gas; top up the relayer account");
                    metrics::record_insufficient_funds();
                } else {
                    tracing::warn!(error = %e, retryable = e.is_retryable(), "Submission failed");
                }
                tracker.fail(&e);
                Err(e)
            }
        }
    }

    /// Current nonce `signer` must sign with for `position`.
    pub async fn nonce_for(&self, position: &str, signer: Address) -> Result<U256, RelayError> {
        let target = self.registry.resolve(position)?;
        self.oracle.current_nonce(target, signer).await
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("positions", &self.registry.len())
            .finish_non_exhaustive()
    }
}

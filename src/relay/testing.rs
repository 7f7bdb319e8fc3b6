//! In-memory oracle and submitter doubles for unit tests.

use alloy::primitives::{keccak256, Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::relay::error::RelayError;
use crate::relay::oracle::NonceOracle;
use crate::relay::submitter::MetaTxSubmitter;
use crate::relay::types::VerifiedMetaTransaction;

pub struct StaticOracle {
    nonce: Result<U256, RelayError>,
    calls: AtomicUsize,
}

impl StaticOracle {
    pub fn new(nonce: u64) -> Self {
        Self {
            nonce: Ok(U256::from(nonce)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            nonce: Err(RelayError::OracleUnavailable("RPC timeout after 10 seconds".into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NonceOracle for StaticOracle {
    async fn current_nonce(&self, _contract: Address, _signer: Address) -> Result<U256, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.nonce.clone()
    }
}

pub struct RecordingSubmitter {
    outcome: Result<TxHash, RelayError>,
    submitted: Mutex<Vec<(Address, VerifiedMetaTransaction)>>,
}

impl RecordingSubmitter {
    pub fn succeeding() -> Self {
        Self::with_outcome(Ok(B256::repeat_byte(0xab)))
    }

    pub fn with_outcome(outcome: Result<TxHash, RelayError>) -> Self {
        Self {
            outcome,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn submitted(&self) -> Vec<(Address, VerifiedMetaTransaction)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetaTxSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        target: Address,
        meta_tx: &VerifiedMetaTransaction,
    ) -> Result<TxHash, RelayError> {
        self.submitted.lock().unwrap().push((target, meta_tx.clone()));
        self.outcome.clone()
    }
}

/// Oracle and submitter sharing one nonce table, so a submission advances
/// the counter the oracle reports, as the contract does.
#[derive(Default)]
pub struct LedgerChain {
    nonces: Mutex<HashMap<(Address, Address), U256>>,
    oracle_calls: AtomicUsize,
    submissions: AtomicUsize,
}

impl LedgerChain {
    pub fn with_nonce(contract: Address, signer: Address, nonce: u64) -> Self {
        let chain = Self::default();
        chain
            .nonces
            .lock()
            .unwrap()
            .insert((contract, signer), U256::from(nonce));
        chain
    }

    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NonceOracle for LedgerChain {
    async fn current_nonce(&self, contract: Address, signer: Address) -> Result<U256, RelayError> {
        self.oracle_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .nonces
            .lock()
            .unwrap()
            .get(&(contract, signer))
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl MetaTxSubmitter for LedgerChain {
    async fn submit(
        &self,
        target: Address,
        meta_tx: &VerifiedMetaTransaction,
    ) -> Result<TxHash, RelayError> {
        let mut nonces = self.nonces.lock().unwrap();
        let current = nonces.entry((target, meta_tx.signer())).or_default();
        if *current != meta_tx.nonce() {
            return Err(RelayError::SubmissionReverted("Signer and signature do not match".into()));
        }
        *current += U256::from(1);
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(keccak256(current.to_be_bytes::<32>()))
    }
}

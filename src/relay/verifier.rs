//! Meta-transaction verification.
//!
//! Checks run in a fixed order:
//! 1. signature encoding
//! 2. signer recovery against the claimed `from`
//! 3. nonce equality with the contract's counter
//!
//! The oracle is consulted only once the signature is known to be genuine,
//! so forged requests cannot be used to probe nonces.

use std::sync::Arc;

use crate::relay::codec::{message_hash, recover, signing_digest};
use crate::relay::error::RelayError;
use crate::relay::oracle::NonceOracle;
use crate::relay::types::{MetaTransaction, VerifiedMetaTransaction};

/// Accepts or rejects meta-transactions before anything is submitted.
#[derive(Clone)]
pub struct MetaTxVerifier {
    oracle: Arc<dyn NonceOracle>,
}

impl MetaTxVerifier {
    pub fn new(oracle: Arc<dyn NonceOracle>) -> Self {
        Self { oracle }
    }

    /// Verify `meta_tx`, performing at most one oracle read.
    pub async fn verify(
        &self,
        meta_tx: MetaTransaction,
    ) -> Result<VerifiedMetaTransaction, RelayError> {
        let normalized = meta_tx.signature.normalized()?;

        let digest = signing_digest(message_hash(
            meta_tx.from,
            meta_tx.target_contract,
            &meta_tx.payload,
            meta_tx.nonce,
        ));
        let recovered = recover(digest, &meta_tx.signature)?;
        if recovered != meta_tx.from {
            return Err(RelayError::SignatureMismatch {
                expected: meta_tx.from,
                recovered,
            });
        }

        let expected = self
            .oracle
            .current_nonce(meta_tx.target_contract, meta_tx.from)
            .await?;
        if meta_tx.nonce != expected {
            return Err(RelayError::StaleNonce {
                expected,
                provided: meta_tx.nonce,
            });
        }

        Ok(VerifiedMetaTransaction {
            inner: meta_tx,
            signature: normalized,
        })
    }
}

impl std::fmt::Debug for MetaTxVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaTxVerifier").finish_non_exhaustive()
    }
}

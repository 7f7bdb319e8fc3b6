//! Relay data model.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::Serialize;

/// Raw ECDSA signature components as submitted by the voter.
///
/// Kept unvalidated until the codec parses them, so a bad `v` is reported
/// as an encoding problem rather than a transport one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureParts {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

/// A voter's signed request, before its position is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTransactionRequest {
    /// Position key naming the target contract.
    pub position: String,
    pub from: Address,
    /// ABI-encoded call the contract executes on the voter's behalf.
    pub payload: Bytes,
    pub nonce: U256,
    pub signature: SignatureParts,
}

impl MetaTransactionRequest {
    pub fn into_meta_transaction(self, target_contract: Address) -> MetaTransaction {
        MetaTransaction {
            from: self.from,
            target_contract,
            payload: self.payload,
            nonce: self.nonce,
            signature: self.signature,
        }
    }
}

/// A meta-transaction bound to its target contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTransaction {
    pub from: Address,
    pub target_contract: Address,
    pub payload: Bytes,
    pub nonce: U256,
    pub signature: SignatureParts,
}

/// A meta-transaction that passed signature and nonce verification.
///
/// Only the verifier constructs this, so holding one means the checks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedMetaTransaction {
    pub(crate) inner: MetaTransaction,
    /// Signature parts with `v` normalized to 27/28 for `ecrecover`.
    pub(crate) signature: SignatureParts,
}

impl VerifiedMetaTransaction {
    pub fn signer(&self) -> Address {
        self.inner.from
    }

    pub fn target_contract(&self) -> Address {
        self.inner.target_contract
    }

    pub fn payload(&self) -> &Bytes {
        &self.inner.payload
    }

    pub fn nonce(&self) -> U256 {
        self.inner.nonce
    }

    pub fn signature(&self) -> SignatureParts {
        self.signature
    }
}

/// Successful relay result handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayReceipt {
    pub transaction_hash: TxHash,
    pub position: String,
    pub from: Address,
    pub nonce: U256,
}

/// Per-request lifecycle.
///
/// ```text
/// Received → Verifying → Rejected
///                      → Verified → Submitting → Confirmed | Reverted | NetworkFailure | Unfunded
/// ```
///
/// `Unfunded` means the relayer wallet could not pay for gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    Received,
    Verifying,
    Rejected,
    Verified,
    Submitting,
    Confirmed,
    Reverted,
    NetworkFailure,
    Unfunded,
}

impl RelayStage {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: RelayStage) -> bool {
        use RelayStage::*;
        matches!(
            (self, next),
            (Received, Verifying)
                | (Received, Rejected)
                | (Verifying, Rejected)
                | (Verifying, Verified)
                | (Verified, Submitting)
                | (Submitting, Confirmed)
                | (Submitting, Reverted)
                | (Submitting, NetworkFailure)
                | (Submitting, Unfunded)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RelayStage::Rejected
                | RelayStage::Confirmed
                | RelayStage::Reverted
                | RelayStage::NetworkFailure
                | RelayStage::Unfunded
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelayStage::Received => "received",
            RelayStage::Verifying => "verifying",
            RelayStage::Rejected => "rejected",
            RelayStage::Verified => "verified",
            RelayStage::Submitting => "submitting",
            RelayStage::Confirmed => "confirmed",
            RelayStage::Reverted => "reverted",
            RelayStage::NetworkFailure => "network_failure",
            RelayStage::Unfunded => "unfunded",
        }
    }
}

impl std::fmt::Display for RelayStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RelayStage::*;

    #[test]
    fn test_stages_only_move_forward() {
        assert!(Received.can_advance_to(Verifying));
        assert!(Verifying.can_advance_to(Verified));
        assert!(Verified.can_advance_to(Submitting));
        assert!(Submitting.can_advance_to(Confirmed));
        assert!(Submitting.can_advance_to(Unfunded));

        assert!(!Verified.can_advance_to(Verifying));
        assert!(!Confirmed.can_advance_to(Submitting));
        assert!(!Rejected.can_advance_to(Verifying));
        assert!(!Verifying.can_advance_to(Submitting));
        assert!(!Verified.can_advance_to(Unfunded));
    }

    #[test]
    fn test_terminal_stages() {
        for stage in [Rejected, Confirmed, Reverted, NetworkFailure, Unfunded] {
            assert!(stage.is_terminal(), "{stage}");
        }
        for stage in [Received, Verifying, Verified, Submitting] {
            assert!(!stage.is_terminal(), "{stage}");
        }
    }
}

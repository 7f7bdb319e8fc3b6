//! Meta-transaction hashing and signature recovery.
//!
//! This is the only place the signed message is constructed. The relay, the
//! CLI signer and the tests all go through these functions, so hashing
//! parameter order cannot drift between callers.
//!
//! # Message layout
//! ```text
//! message_hash   = keccak256(from[20] ‖ target[20] ‖ payload[..] ‖ nonce[32, big-endian])
//! signing_digest = keccak256("\x19Ethereum Signed Message:\n32" ‖ message_hash)
//! ```
//! `message_hash` equals `keccak256(abi.encodePacked(from, target, payload, nonce))`
//! as computed by the contract. Voters sign it with `personal_sign`, which is
//! what produces the prefixed `signing_digest`; the unprefixed form is never
//! accepted.

use alloy::primitives::{eip191_hash_message, keccak256, uint, Address, Signature, B256, U256};
use alloy::signers::Signer;

use crate::relay::error::RelayError;
use crate::relay::types::SignatureParts;

/// Half the secp256k1 group order. An `s` above this is the malleable twin
/// of a canonical signature.
const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// Hash of the packed meta-transaction fields.
pub fn message_hash(from: Address, target: Address, payload: &[u8], nonce: U256) -> B256 {
    let mut packed = Vec::with_capacity(20 + 20 + payload.len() + 32);
    packed.extend_from_slice(from.as_slice());
    packed.extend_from_slice(target.as_slice());
    packed.extend_from_slice(payload);
    packed.extend_from_slice(&nonce.to_be_bytes::<32>());
    keccak256(&packed)
}

/// Digest actually signed by the voter's wallet (EIP-191 personal message).
pub fn signing_digest(message_hash: B256) -> B256 {
    eip191_hash_message(message_hash)
}

impl SignatureParts {
    /// Build from raw wire components; `r` and `s` must be exactly 32 bytes.
    pub fn parse(r: &[u8], s: &[u8], v: u8) -> Result<Self, RelayError> {
        if r.len() != 32 || s.len() != 32 {
            return Err(RelayError::InvalidSignatureEncoding(format!(
                "r and s must be 32 bytes each, got {} and {}",
                r.len(),
                s.len()
            )));
        }
        let parts = Self {
            r: B256::from_slice(r),
            s: B256::from_slice(s),
            v,
        };
        parts.y_parity()?;
        Ok(parts)
    }

    /// Recovery parity from `v`, accepting both the 27/28 and 0/1 conventions.
    pub fn y_parity(&self) -> Result<bool, RelayError> {
        match self.v {
            0 | 27 => Ok(false),
            1 | 28 => Ok(true),
            other => Err(RelayError::InvalidSignatureEncoding(format!(
                "v must be 27, 28, 0 or 1, got {}",
                other
            ))),
        }
    }

    /// Parse into a signature usable for recovery.
    pub fn to_signature(&self) -> Result<Signature, RelayError> {
        let parity = self.y_parity()?;
        let r = U256::from_be_slice(self.r.as_slice());
        let s = U256::from_be_slice(self.s.as_slice());
        if r.is_zero() || s.is_zero() {
            return Err(RelayError::InvalidSignatureEncoding(
                "r and s must be non-zero".to_string(),
            ));
        }
        if s > SECP256K1_HALF_N {
            return Err(RelayError::InvalidSignatureEncoding(
                "s is in the upper half of the curve order".to_string(),
            ));
        }
        Ok(Signature::new(r, s, parity))
    }

    /// Same signature with `v` in the 27/28 form `ecrecover` expects.
    pub fn normalized(&self) -> Result<SignatureParts, RelayError> {
        let parity = self.y_parity()?;
        Ok(SignatureParts {
            r: self.r,
            s: self.s,
            v: if parity { 28 } else { 27 },
        })
    }

    pub fn from_signature(signature: &Signature) -> Self {
        Self {
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
            v: if signature.v() { 28 } else { 27 },
        }
    }
}

/// Recover the address that produced `signature` over `digest`.
pub fn recover(digest: B256, signature: &SignatureParts) -> Result<Address, RelayError> {
    let signature = signature.to_signature()?;
    signature.recover_address_from_prehash(&digest).map_err(|e| {
        RelayError::InvalidSignatureEncoding(format!("signature is not recoverable: {}", e))
    })
}

/// Sign a meta-transaction the way a voter's wallet does.
pub async fn sign_meta_transaction<S>(
    signer: &S,
    target: Address,
    payload: &[u8],
    nonce: U256,
) -> alloy::signers::Result<SignatureParts>
where
    S: Signer + Sync,
{
    let hash = message_hash(signer.address(), target, payload, nonce);
    // sign_message applies the EIP-191 prefix, yielding signing_digest(hash)
    let signature = signer.sign_message(hash.as_slice()).await?;
    Ok(SignatureParts::from_signature(&signature))
}

//! Meta-transaction relay subsystem.
//!
//! # Data Flow
//! ```text
//! MetaTransactionRequest (position key + signed fields)
//!     → service.rs (resolve position via ContractRegistry)
//!     → verifier.rs
//!         → codec.rs (message hash, signing digest, signer recovery)
//!         → oracle.rs (getNonce on the target contract)
//!     → submitter.rs (executeMetaTransaction, paid by the relayer wallet)
//!     → RelayReceipt { transaction_hash } | RelayError
//! ```
//!
//! # Design Decisions
//! - codec.rs is the single definition of the signed message; the CLI signs with it too
//! - Oracle and submitter are traits so tests substitute an in-memory chain
//! - Nothing is retried here; retryable errors are flagged for the caller

pub mod codec;
pub mod error;
pub mod oracle;
pub mod service;
pub mod submitter;
pub mod types;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorKind, RelayError};
pub use oracle::{ChainNonceOracle, NonceOracle};
pub use service::RelayService;
pub use submitter::{ChainSubmitter, MetaTxSubmitter};
pub use types::{
    MetaTransaction, MetaTransactionRequest, RelayReceipt, RelayStage, SignatureParts,
    VerifiedMetaTransaction,
};
pub use verifier::MetaTxVerifier;

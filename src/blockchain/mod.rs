//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variable (relayer private key)
//!     → wallet.rs (key loading, transaction signing, account nonce)
//! Config [chain] (RPC URLs, timeouts)
//!     → client.rs (RPC connection with failover and timeouts)
//!     → transaction.rs (estimate, fund check, sign, broadcast, confirm)
//! contracts.rs (typed election contract interface)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod client;
pub mod contracts;
#[cfg(test)]
pub(crate) mod testing;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use contracts::IElectionPosition;
pub use transaction::TxBuilder;
pub use types::{BlockchainError, BlockchainResult, ChainConfig, ChainId, ConfirmationStatus};
pub use wallet::Wallet;

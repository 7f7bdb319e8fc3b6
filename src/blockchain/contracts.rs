//! Typed interface of the per-position election contract.
//!
//! Every address in the contract registry must expose this interface; the
//! registry is checked against it at startup (see `registry::verify`).

use alloy::sol;

sol! {
    /// Election position contract with native meta-transaction support.
    #[derive(Debug, PartialEq, Eq)]
    interface IElectionPosition {
        /// Current meta-transaction replay counter of `user`.
        function getNonce(address user) external view returns (uint256);

        /// Execute `functionSignature` on behalf of `userAddress`.
        function executeMetaTransaction(
            address userAddress,
            bytes functionSignature,
            bytes32 sigR,
            bytes32 sigS,
            uint8 sigV
        ) external payable returns (bytes);

        /// Cast a vote for `candidateId`.
        function vote(uint256 candidateId) external;
    }
}

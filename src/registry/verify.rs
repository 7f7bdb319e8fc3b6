//! Startup verification of registered deployments.
//!
//! Each registered address must hold code and answer `getNonce(address)`.
//! A registry pointing at a stale or wrong deployment fails here instead of
//! on the first voter's request.

use alloy::primitives::Address;

use crate::blockchain::BlockchainClient;
use crate::registry::contracts::{ContractRegistry, RegistryError};
use crate::relay::oracle::NonceOracle;

/// Check every registered deployment, stopping at the first failure.
pub async fn verify_deployments(
    registry: &ContractRegistry,
    client: &BlockchainClient,
    oracle: &dyn NonceOracle,
) -> Result<(), RegistryError> {
    for (key, address) in registry.iter() {
        let failed = |reason: String| RegistryError::Verification {
            key: key.to_string(),
            address,
            reason,
        };

        let code = client.get_code(address).await.map_err(|e| failed(e.to_string()))?;
        if code.is_empty() {
            return Err(failed("no contract code at address".to_string()));
        }

        oracle
            .current_nonce(address, Address::ZERO)
            .await
            .map_err(|e| failed(format!("getNonce call failed: {}", e)))?;

        tracing::info!(position = key, address = %address, "Deployment verified");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ChainConfig;
    use crate::relay::oracle::ChainNonceOracle;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_unreachable_chain_fails_verification() {
        let config = ChainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 1,
            ..ChainConfig::default()
        };
        let client = BlockchainClient::new(config).await.unwrap();
        let oracle = ChainNonceOracle::new(client.clone());

        let mut positions = BTreeMap::new();
        positions.insert("president".to_string(), Address::repeat_byte(0x01));
        let registry = ContractRegistry::new(positions).unwrap();

        let err = verify_deployments(&registry, &client, &oracle).await.unwrap_err();
        assert!(matches!(err, RegistryError::Verification { key, .. } if key == "president"));
    }
}

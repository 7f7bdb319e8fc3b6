//! Registry loading from the deployment manifest and inline config.
//!
//! The manifest is the JSON file written by the contract deployment tooling:
//! ```json
//! { "president": "0x5FbDB2315678afecb367f032d93F642f64180aa3" }
//! ```
//! or, with deployment metadata alongside,
//! ```json
//! { "network": "sepolia", "positions": { "president": "0x..." } }
//! ```

use alloy::primitives::Address;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::RegistryConfig;
use crate::registry::contracts::{ContractRegistry, RegistryError};

/// Parse manifest JSON into raw key/address strings.
pub fn parse_manifest(path: &str, json: &str) -> Result<BTreeMap<String, String>, RegistryError> {
    let parse_err = |message: String| RegistryError::Parse {
        path: path.to_string(),
        message,
    };

    let root: Value = serde_json::from_str(json).map_err(|e| parse_err(e.to_string()))?;
    let object = match root.get("positions") {
        Some(Value::Object(nested)) => nested,
        Some(_) => return Err(parse_err("\"positions\" must be an object".to_string())),
        None => root
            .as_object()
            .ok_or_else(|| parse_err("manifest must be a JSON object".to_string()))?,
    };

    object
        .iter()
        .map(|(key, value)| match value {
            Value::String(address) => Ok((key.clone(), address.clone())),
            other => Err(parse_err(format!(
                "position '{}' must map to an address string, found {}",
                key, other
            ))),
        })
        .collect()
}

/// Merge manifest and inline entries into a validated registry.
pub fn build_registry(
    manifest: BTreeMap<String, String>,
    inline: &BTreeMap<String, String>,
) -> Result<ContractRegistry, RegistryError> {
    let mut positions = BTreeMap::new();

    for (key, value) in &manifest {
        positions.insert(key.clone(), parse_address(key, value)?);
    }

    for (key, value) in inline {
        let address = parse_address(key, value)?;
        match positions.get(key) {
            Some(existing) if *existing != address => {
                return Err(RegistryError::Conflict {
                    key: key.clone(),
                    manifest: *existing,
                    inline: address,
                });
            }
            _ => {
                positions.insert(key.clone(), address);
            }
        }
    }

    if positions.is_empty() {
        return Err(RegistryError::Empty);
    }
    ContractRegistry::new(positions)
}

/// Load the registry described by `config`.
pub fn load_registry(config: &RegistryConfig) -> Result<ContractRegistry, RegistryError> {
    let manifest = match &config.manifest_path {
        Some(path) => {
            let json = std::fs::read_to_string(Path::new(path)).map_err(|source| {
                RegistryError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
            parse_manifest(path, &json)?
        }
        None => BTreeMap::new(),
    };

    let registry = build_registry(manifest, &config.positions)?;
    tracing::info!(
        positions = registry.len(),
        manifest = config.manifest_path.as_deref().unwrap_or("-"),
        "Contract registry loaded"
    );
    Ok(registry)
}

fn parse_address(key: &str, value: &str) -> Result<Address, RegistryError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| RegistryError::InvalidAddress {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESIDENT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const REP: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

    #[test]
    fn test_flat_manifest() {
        let json = format!(r#"{{ "president": "{}", "engineering_academicRep": "{}" }}"#, PRESIDENT, REP);
        let entries = parse_manifest("m.json", &json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["president"], PRESIDENT);
    }

    #[test]
    fn test_nested_manifest_ignores_metadata() {
        let json = format!(
            r#"{{ "network": "sepolia", "chainId": 11155111, "positions": {{ "president": "{}" }} }}"#,
            PRESIDENT
        );
        let entries = parse_manifest("m.json", &json).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_non_string_entry_rejected() {
        let err = parse_manifest("m.json", r#"{ "president": 5 }"#).unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
        assert!(err.to_string().contains("president"));
    }

    #[test]
    fn test_merge_agreeing_sources() {
        let mut manifest = BTreeMap::new();
        manifest.insert("president".to_string(), PRESIDENT.to_string());
        let mut inline = BTreeMap::new();
        inline.insert("president".to_string(), PRESIDENT.to_lowercase());
        inline.insert("engineering_academicRep".to_string(), REP.to_string());

        let registry = build_registry(manifest, &inline).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("president").unwrap(), PRESIDENT.parse::<Address>().unwrap());
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        let mut manifest = BTreeMap::new();
        manifest.insert("president".to_string(), PRESIDENT.to_string());
        let mut inline = BTreeMap::new();
        inline.insert("president".to_string(), REP.to_string());

        let err = build_registry(manifest, &inline).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { key, .. } if key == "president"));
    }

    #[test]
    fn test_bad_address_and_empty() {
        let mut inline = BTreeMap::new();
        inline.insert("president".to_string(), "0x1234".to_string());
        assert!(matches!(
            build_registry(BTreeMap::new(), &inline),
            Err(RegistryError::InvalidAddress { .. })
        ));
        assert!(matches!(
            build_registry(BTreeMap::new(), &BTreeMap::new()),
            Err(RegistryError::Empty)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("ballot-relay-manifest-{}.json", std::process::id()));
        std::fs::write(&path, format!(r#"{{ "positions": {{ "president": "{}" }} }}"#, PRESIDENT)).unwrap();

        let config = RegistryConfig {
            manifest_path: Some(path.to_string_lossy().into_owned()),
            ..RegistryConfig::default()
        };
        let registry = load_registry(&config).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_manifest_is_io_error() {
        let config = RegistryConfig {
            manifest_path: Some("/nonexistent/ballot-relay/manifest.json".to_string()),
            ..RegistryConfig::default()
        };
        assert!(matches!(load_registry(&config), Err(RegistryError::Io { .. })));
    }
}

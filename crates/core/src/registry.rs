//! Contract registry: locators, resolved addresses, and signature tables.
//!
//! Three parallel mappings keyed by label (and, for signatures, by locator).
//! Entries are only ever added or overwritten during a run.

use std::collections::BTreeMap;

use crate::artifact::{ArtifactStore, SignatureTable};
use crate::error::{DeployError, Result};
use crate::types::{Address, Label, Locator};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    pub(crate) contracts: BTreeMap<Label, String>,
    pub(crate) addresses: BTreeMap<Label, Address>,
    pub(crate) signatures: BTreeMap<String, SignatureTable>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `label`, loading signatures when `locator` is non-empty and
    /// recording `address` when supplied.
    ///
    /// Nothing is stored unless the artifact loads cleanly.
    pub fn register(
        &mut self,
        label: Label,
        locator: &str,
        address: Option<Address>,
        artifacts: &ArtifactStore,
    ) -> Result<()> {
        if !locator.is_empty() {
            let parsed: Locator = locator.parse()?;
            let table = artifacts.load_signatures(&parsed)?;
            tracing::debug!(
                label = %label,
                locator = %parsed,
                functions = table.len(),
                "Loaded contract signatures",
            );
            self.signatures.insert(parsed.to_string(), table);
            self.contracts.insert(label.clone(), parsed.to_string());
        }

        if let Some(address) = address {
            self.addresses.insert(label, address);
        }
        Ok(())
    }

    pub fn resolve_address(&self, label: &Label) -> Result<&Address> {
        self.addresses
            .get(label)
            .ok_or_else(|| DeployError::UnresolvedAddress(label.clone()))
    }

    pub fn locator(&self, label: &Label) -> Result<&str> {
        self.contracts
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| DeployError::UnregisteredContract(label.clone()))
    }

    pub fn signature_for(&self, locator: &str, function: &str) -> Result<&str> {
        self.signatures
            .get(locator)
            .and_then(|table| table.get(function))
            .map(String::as_str)
            .ok_or_else(|| DeployError::UnknownFunction {
                function: function.to_string(),
                locator: locator.to_string(),
            })
    }

    pub fn set_address(&mut self, label: Label, address: Address) {
        self.addresses.insert(label, address);
    }

    pub fn addresses(&self) -> &BTreeMap<Label, Address> {
        &self.addresses
    }

    pub fn contracts(&self) -> &BTreeMap<Label, String> {
        &self.contracts
    }

    pub fn signatures(&self) -> &BTreeMap<String, SignatureTable> {
        &self.signatures
    }

    /// Emit the registry state for an operator diagnosing a run.
    pub fn log_state(&self, with_signatures: bool) {
        for (label, address) in &self.addresses {
            tracing::info!(label = %label, address = %address, "Resolved address");
        }
        if with_signatures {
            for (label, locator) in &self.contracts {
                tracing::info!(label = %label, locator = %locator, "Registered contract");
            }
            for (locator, table) in &self.signatures {
                for signature in table.values() {
                    tracing::info!(locator = %locator, signature = %signature, "Known signature");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    fn artifacts_with_token() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let artifact_dir = dir.path().join("Token.sol");
        std::fs::create_dir_all(&artifact_dir).unwrap();
        std::fs::write(
            artifact_dir.join("Token.json"),
            r#"{"abi": [{"type": "function", "name": "transfer", "inputs": [{"type": "address"}, {"type": "uint256"}]}]}"#,
        )
        .unwrap();
        let store = ArtifactStore::new(dir.path(), ".sol");
        (dir, store)
    }

    #[test]
    fn register_with_locator_loads_signatures() {
        let (_dir, store) = artifacts_with_token();
        let mut registry = Registry::new();
        registry
            .register("TOKEN".into(), "src/Token.sol:Token", None, &store)
            .unwrap();

        assert_eq!(registry.locator(&"TOKEN".into()).unwrap(), "src/Token.sol:Token");
        assert_eq!(
            registry.signature_for("src/Token.sol:Token", "transfer").unwrap(),
            "transfer(address,uint256)"
        );
        assert_matches!(
            registry.resolve_address(&"TOKEN".into()),
            Err(DeployError::UnresolvedAddress(_))
        );
    }

    #[test]
    fn register_external_contract_with_address_only() {
        let (_dir, store) = artifacts_with_token();
        let mut registry = Registry::new();
        registry
            .register("WETH".into(), "", Some(ADDR.parse().unwrap()), &store)
            .unwrap();

        assert_eq!(registry.resolve_address(&"WETH".into()).unwrap().as_str(), ADDR);
        assert_matches!(
            registry.locator(&"WETH".into()),
            Err(DeployError::UnregisteredContract(_))
        );
    }

    #[test]
    fn failed_registration_stores_nothing() {
        let (_dir, store) = artifacts_with_token();
        let mut registry = Registry::new();
        let result = registry.register(
            "VAULT".into(),
            "src/Vault.sol:Vault",
            Some(ADDR.parse().unwrap()),
            &store,
        );

        assert_matches!(result, Err(DeployError::ArtifactNotFound { .. }));
        assert_eq!(registry, Registry::new());
    }

    #[test]
    fn unknown_function_is_reported() {
        let (_dir, store) = artifacts_with_token();
        let mut registry = Registry::new();
        registry
            .register("TOKEN".into(), "src/Token.sol:Token", None, &store)
            .unwrap();

        assert_matches!(
            registry.signature_for("src/Token.sol:Token", "burn"),
            Err(DeployError::UnknownFunction { function, .. }) if function == "burn"
        );
    }

    #[test]
    fn reregistering_overwrites_address() {
        let (_dir, store) = artifacts_with_token();
        let mut registry = Registry::new();
        registry
            .register("WETH".into(), "", Some(ADDR.parse().unwrap()), &store)
            .unwrap();
        let other = "0x2222222222222222222222222222222222222222";
        registry
            .register("WETH".into(), "", Some(other.parse().unwrap()), &store)
            .unwrap();

        assert_eq!(registry.resolve_address(&"WETH".into()).unwrap().as_str(), other);
    }
}

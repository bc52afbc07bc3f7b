//! Central contract registry.

use std::collections::HashMap;

use crate::builtin;
use crate::contract::DatasetContract;
use crate::error::RegistryError;

/// Process-wide store of all dataset contracts.
///
/// Initialized once at process start; read-only during runs. There is no
/// interior mutability — build it, then share `&Registry`.
#[derive(Debug, Default)]
pub struct Registry {
    contracts: HashMap<(String, String), DatasetContract>,
}

impl Registry {
    /// An empty registry. Mostly useful in tests; production hosts want
    /// [`Self::with_builtin`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry containing every known provider contract.
    ///
    /// # Panics
    ///
    /// Panics if the built-in contract set is internally inconsistent, which
    /// is a programming error caught by the test suite, not a runtime
    /// condition.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        builtin::register_builtin(&mut registry)
            .unwrap_or_else(|e| panic!("built-in contract set is inconsistent: {e}"));
        registry
    }

    /// Register a contract.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRegistration`] if a contract for the
    /// same (provider, dataset) is already present, or
    /// [`RegistryError::InvalidContract`] if the primary key references
    /// undeclared columns.
    pub fn register(&mut self, contract: DatasetContract) -> Result<(), RegistryError> {
        if !contract.primary_key_is_declared() {
            return Err(RegistryError::InvalidContract {
                provider: contract.provider,
                dataset: contract.dataset,
                reason: "primary key references undeclared columns".to_string(),
            });
        }
        if contract.primary_key.is_empty() {
            return Err(RegistryError::InvalidContract {
                provider: contract.provider,
                dataset: contract.dataset,
                reason: "primary key must not be empty".to_string(),
            });
        }

        let key = (contract.provider.clone(), contract.dataset.clone());
        if self.contracts.contains_key(&key) {
            return Err(RegistryError::DuplicateRegistration {
                provider: key.0,
                dataset: key.1,
            });
        }
        self.contracts.insert(key, contract);
        Ok(())
    }

    /// Look up the contract for (provider, dataset).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownDataset`] if nothing is registered
    /// under that pair.
    pub fn resolve(&self, provider: &str, dataset: &str) -> Result<&DatasetContract, RegistryError> {
        self.contracts
            .get(&(provider.to_string(), dataset.to_string()))
            .ok_or_else(|| RegistryError::UnknownDataset {
                provider: provider.to_string(),
                dataset: dataset.to_string(),
            })
    }

    /// All registered (provider, dataset) pairs, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .contracts
            .keys()
            .map(|(p, d)| (p.as_str(), d.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of registered contracts.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }
}

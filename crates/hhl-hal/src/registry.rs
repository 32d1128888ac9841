//! Name-keyed backend construction.
//!
//! Configuration names a backend by string (`statevector_simulator`,
//! `qasm_simulator`, ...); the registry maps that name to a constructor.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

type Constructor = Box<dyn Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Backend constructors keyed by name. Several names may share one type.
#[derive(Default)]
pub struct BackendRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `B` constructible as `name`. A later registration under the same
    /// name replaces the earlier one.
    pub fn register<B>(&mut self, name: impl Into<String>)
    where
        B: BackendFactory + 'static,
    {
        self.register_factory(name, |config| {
            B::from_config(config).map(|backend| Box::new(backend) as Box<dyn Backend>)
        });
    }

    /// Register a closure as the constructor for `name`.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!(backend = %name, "backend registered");
        self.constructors.insert(name, Box::new(factory));
    }

    /// Build the backend registered as `name`.
    pub fn create(&self, name: &str, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        let constructor = self.constructors.get(name).ok_or_else(|| {
            HalError::BackendUnavailable(format!(
                "'{name}' is not registered (known: {})",
                self.available_backends().join(", ")
            ))
        })?;
        constructor(config)
    }

    /// Registered names, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refuse(_: BackendConfig) -> HalResult<Box<dyn Backend>> {
        Err(HalError::Configuration("refused".into()))
    }

    #[test]
    fn test_unknown_name_lists_known_ones() {
        let mut registry = BackendRegistry::new();
        registry.register_factory("qasm_simulator", refuse);

        let err = registry
            .create("ibm_torino", BackendConfig::new("ibm_torino"))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("'ibm_torino' is not registered"));
        assert!(err.contains("qasm_simulator"));
    }

    #[test]
    fn test_constructor_errors_pass_through() {
        let mut registry = BackendRegistry::new();
        registry.register_factory("statevector_simulator", refuse);
        assert!(matches!(
            registry.create("statevector_simulator", BackendConfig::new("statevector_simulator")),
            Err(HalError::Configuration(_))
        ));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = BackendRegistry::new();
        assert!(registry.available_backends().is_empty());
        registry.register_factory("statevector_simulator", refuse);
        registry.register_factory("qasm_simulator", refuse);

        assert!(registry.has_backend("qasm_simulator"));
        assert_eq!(
            registry.available_backends(),
            vec!["qasm_simulator", "statevector_simulator"]
        );
        assert_eq!(
            format!("{registry:?}"),
            r#"{"qasm_simulator", "statevector_simulator"}"#
        );
    }
}

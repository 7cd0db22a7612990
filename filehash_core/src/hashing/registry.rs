//! Central registry for hash algorithm implementations

use super::HashAlgorithm;
use super::traits::HashAlgorithmImpl;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Central registry for all content checks
pub struct AlgorithmRegistry {
    algorithms: HashMap<&'static str, Arc<dyn HashAlgorithmImpl>>,
}

impl AlgorithmRegistry {
    /// Create a new empty registry
    fn new() -> Self {
        Self {
            algorithms: HashMap::new(),
        }
    }

    /// Get the global registry instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceCell<AlgorithmRegistry> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let mut registry = Self::new();
            super::algorithms::register_all(&mut registry);
            registry
        })
    }

    /// Register a new algorithm
    pub(crate) fn register(&mut self, algorithm: impl HashAlgorithmImpl + 'static) {
        self.algorithms.insert(algorithm.id(), Arc::new(algorithm));
    }

    /// Get algorithm by ID
    pub fn get(&self, id: &str) -> Option<Arc<dyn HashAlgorithmImpl>> {
        self.algorithms.get(id).cloned()
    }

    /// Resolve a built-in algorithm
    ///
    /// Every `HashAlgorithm` variant is registered by `register_all`, so the
    /// fallback arm only exists to keep this infallible.
    pub(crate) fn resolve(&self, algorithm: HashAlgorithm) -> Arc<dyn HashAlgorithmImpl> {
        match self.get(&algorithm.to_string()) {
            Some(found) => found,
            None => super::algorithms::builtin(algorithm),
        }
    }
}

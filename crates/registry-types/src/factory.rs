//! # Factory Registry
//!
//! Maps implementation identifiers from configuration to constructors.
//! Populated once at process start; lookups of unknown identifiers become a
//! typed [`ResolutionError`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::errors::{ComponentKind, ResolutionError};

type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

/// Identifier → constructor table for one component kind.
pub struct FactoryRegistry<T: ?Sized> {
    kind: ComponentKind,
    factories: RwLock<HashMap<String, Factory<T>>>,
}

impl<T: ?Sized> FactoryRegistry<T> {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            factories: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Register a constructor, replacing any earlier one for the identifier.
    pub fn register<F>(&self, implementation_id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let implementation_id = implementation_id.into();
        let previous = self
            .factories
            .write()
            .insert(implementation_id.clone(), Arc::new(factory));
        if previous.is_some() {
            warn!(
                kind = %self.kind,
                implementation_id = %implementation_id,
                "Replacing previously registered factory"
            );
        } else {
            debug!(kind = %self.kind, implementation_id = %implementation_id, "Factory registered");
        }
    }

    /// Construct a fresh instance for `implementation_id`.
    pub fn create(&self, implementation_id: &str) -> Result<Box<T>, ResolutionError> {
        // Clone the constructor out so user code never runs under the lock.
        let factory = self
            .factories
            .read()
            .get(implementation_id)
            .cloned()
            .ok_or_else(|| ResolutionError {
                kind: self.kind,
                implementation_id: implementation_id.to_string(),
            })?;
        Ok(factory())
    }

    pub fn contains(&self, implementation_id: &str) -> bool {
        self.factories.read().contains_key(implementation_id)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.factories.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send {
        fn greet(&self) -> String;
    }

    struct Hello;
    impl Greeter for Hello {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    struct Hi;
    impl Greeter for Hi {
        fn greet(&self) -> String {
            "hi".to_string()
        }
    }

    #[test]
    fn test_create_registered() {
        let registry: FactoryRegistry<dyn Greeter> = FactoryRegistry::new(ComponentKind::Module);
        registry.register("hello", || Box::new(Hello));
        assert_eq!(registry.create("hello").unwrap().greet(), "hello");
        assert!(registry.contains("hello"));
    }

    #[test]
    fn test_unknown_identifier() {
        let registry: FactoryRegistry<dyn Greeter> =
            FactoryRegistry::new(ComponentKind::StorageProvider);
        let err = registry.create("missing").err().unwrap();
        assert_eq!(err.kind, ComponentKind::StorageProvider);
        assert_eq!(err.implementation_id, "missing");
    }

    #[test]
    fn test_register_replaces() {
        let registry: FactoryRegistry<dyn Greeter> = FactoryRegistry::new(ComponentKind::Module);
        registry.register("greeter", || Box::new(Hello));
        registry.register("greeter", || Box::new(Hi));
        assert_eq!(registry.create("greeter").unwrap().greet(), "hi");
        assert_eq!(registry.identifiers(), vec!["greeter".to_string()]);
    }
}

//! Accessor registry.
//!
//! Maps a namespace name to a factory producing the accessor handler for
//! that namespace. Registration is explicit: callers construct a registry,
//! register factories, and look handlers up by name. There is no global
//! mutable state and no dynamic attribute interception.

use indexmap::IndexMap;
use tracing::debug;

use fluxion_dataset::{Dataset, Result};
use fluxion_foundation::DimArray;

use crate::derived::DriftAccessor;

/// An accessor bound to no particular dataset: it names its namespace,
/// lists the derived quantities it can produce, and computes them on a
/// dataset passed per call.
pub trait DatasetAccessor {
    /// Namespace this accessor serves (e.g., "drift").
    fn namespace(&self) -> &'static str;

    /// Derived-field names this accessor can compute, in table order.
    fn derived_names(&self) -> Vec<&'static str>;

    /// Compute (or fetch from cache) the named derived field.
    fn compute(&self, ds: &mut Dataset, name: &str) -> Result<DimArray>;
}

impl DatasetAccessor for DriftAccessor {
    fn namespace(&self) -> &'static str {
        "drift"
    }

    fn derived_names(&self) -> Vec<&'static str> {
        DriftAccessor::derived_names(self)
    }

    fn compute(&self, ds: &mut Dataset, name: &str) -> Result<DimArray> {
        self.derived(ds, name)
    }
}

/// Factory producing a boxed accessor handler.
pub type AccessorFactory = fn() -> Box<dyn DatasetAccessor>;

/// Explicit registry of accessor namespaces.
///
/// # Example
///
/// ```
/// use fluxion_accessors::AccessorRegistry;
///
/// let registry = AccessorRegistry::with_builtins();
/// assert!(registry.is_known("drift"));
/// assert_eq!(registry.all_names().collect::<Vec<_>>(), vec!["drift"]);
/// ```
#[derive(Default)]
pub struct AccessorRegistry {
    factories: IndexMap<&'static str, AccessorFactory>,
}

impl AccessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in namespaces registered
    /// (currently `"drift"`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("drift", || Box::new(DriftAccessor::new()));
        registry
    }

    /// Register a namespace. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&mut self, namespace: &'static str, factory: AccessorFactory) {
        debug!(namespace, "accessor namespace registered");
        self.factories.insert(namespace, factory);
    }

    /// Construct the accessor for a namespace.
    pub fn get(&self, namespace: &str) -> Option<Box<dyn DatasetAccessor>> {
        self.factories.get(namespace).map(|factory| factory())
    }

    /// Check if a namespace is registered.
    pub fn is_known(&self, namespace: &str) -> bool {
        self.factories.contains_key(namespace)
    }

    /// All registered namespace names, in registration order.
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}

//! Fluxion Accessors
//!
//! Derived physical quantities computed on demand from dataset fields and
//! cached back onto the dataset, so repeated access costs one lookup.
//!
//! # Architecture
//!
//! Each derived quantity is one [`DerivedFieldSpec`] entry in a declarative
//! table: derived name, source field, coordinate to differentiate along,
//! sign, optional divisor field, metadata tag. [`DriftAccessor`] evaluates
//! entries with the compute-or-fetch contract; adding a quantity means
//! adding a table entry, not control flow.
//!
//! Namespaced access goes through [`AccessorRegistry`], an explicit map
//! from namespace name to a factory producing the handler:
//!
//! ```
//! use fluxion_accessors::AccessorRegistry;
//!
//! let registry = AccessorRegistry::with_builtins();
//! assert!(registry.is_known("drift"));
//! let accessor = registry.get("drift").unwrap();
//! assert!(accessor.derived_names().contains(&"v_radial"));
//! ```

pub mod derived;
pub mod registry;

pub use derived::{DerivedFieldSpec, DriftAccessor, Sign, EXB_DRIFTS};
pub use registry::{AccessorFactory, AccessorRegistry, DatasetAccessor};

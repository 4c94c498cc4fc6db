//! Fluxion Foundation
//!
//! Core foundational types for the fluxion post-processing toolkit.
//! Provides labeled multi-dimensional arrays, typed string identifiers,
//! and attribute values shared across crates.

pub mod array;
pub mod attrs;
pub mod ids;

// Re-export the primary types at crate root
pub use array::{ArrayError, DimArray};
pub use attrs::{AttrValue, Attrs, LONG_NAME};
pub use ids::{CoordId, FieldId};

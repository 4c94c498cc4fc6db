//! Errors for dataset operations.
//!
//! # Error Categories
//!
//! - **Missing dependencies**: [`Error::MissingField`], [`Error::MissingCoordinate`],
//!   [`Error::MissingMetadata`] - a required input is absent; the message names it.
//! - **Shape errors**: [`Error::DimensionNotFound`], [`Error::ShapeMismatch`],
//!   [`Error::Array`].
//! - **Topology errors**: [`Error::UnknownRegion`].
//! - **Accessor errors**: [`Error::UnknownDerivedField`].
//!
//! # Error Handling Policy
//!
//! A missing dependency is fatal to the call that needed it and is surfaced
//! to the caller; nothing is fabricated in its place. Numeric edge results
//! (division by zero producing inf/NaN) are not errors; they are
//! representable values and pass through untouched.

use thiserror::Error;

pub use fluxion_foundation::ArrayError;

/// Dataset result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while operating on a dataset.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is not present in the dataset.
    ///
    /// Derived-field computation requires its source and divisor fields
    /// to be present; they are never fabricated.
    #[error("missing field: {name}")]
    MissingField {
        /// Name of the absent field.
        name: String,
    },

    /// A required coordinate is not present in the dataset.
    #[error("missing coordinate: {name}")]
    MissingCoordinate {
        /// Name of the absent coordinate.
        name: String,
    },

    /// A required run-metadata key is not present.
    ///
    /// Region decomposition reads grid sizes and separatrix indices from
    /// run metadata; an absent key means the dataset was not produced by
    /// a compatible run.
    #[error("missing metadata key: {key}")]
    MissingMetadata {
        /// The absent metadata key.
        key: String,
    },

    /// A named dimension is not an axis of the field it was requested on.
    #[error("dimension '{dim}' not found on field '{field}'")]
    DimensionNotFound {
        /// The requested dimension.
        dim: String,
        /// The field that lacks it.
        field: String,
    },

    /// An array has a different extent than required.
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// What was being checked.
        context: String,
        /// The required extent.
        expected: usize,
        /// The extent actually found.
        found: usize,
    },

    /// A cross-array operation failed (broadcast mismatch).
    #[error(transparent)]
    Array(#[from] ArrayError),

    /// A region name was requested that the decomposition did not produce.
    #[error("unknown region: {name}")]
    UnknownRegion {
        /// The requested region name.
        name: String,
    },

    /// A derived-field name with no rule in any registered table.
    #[error("unknown derived field: {name}")]
    UnknownDerivedField {
        /// The requested derived-field name.
        name: String,
    },
}

impl Error {
    /// Construct a missing-field error.
    pub fn missing_field(name: impl Into<String>) -> Self {
        Error::MissingField { name: name.into() }
    }

    /// Construct a missing-coordinate error.
    pub fn missing_coordinate(name: impl Into<String>) -> Self {
        Error::MissingCoordinate { name: name.into() }
    }
}

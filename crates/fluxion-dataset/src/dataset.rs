//! The labeled dataset container.
//!
//! A [`Dataset`] is a named collection of [`DimArray`] fields sharing a set
//! of coordinates, plus run metadata (grid sizes, separatrix indices, guard
//! cell counts) carried as scalar attributes.
//!
//! # Key Operations
//!
//! - Field lookup/insertion via [`Dataset::try_field`] / [`Dataset::insert_field`]
//! - Coordinate lookup via [`Dataset::try_coord`]
//! - [`Dataset::strip_scalar_metadata`] - move 0-dimensional fields into
//!   run metadata (every scalar variable is metadata, not physical data)
//!
//! # Example
//!
//! ```
//! use fluxion_dataset::Dataset;
//! use fluxion_foundation::DimArray;
//!
//! let mut ds = Dataset::new();
//! ds.insert_coord("x", DimArray::from_vec(&["x"], &[3], vec![0.0, 1.0, 2.0])).unwrap();
//! ds.insert_field("n", DimArray::zeros(&["x"], &[3])).unwrap();
//!
//! assert!(ds.contains_field("n"));
//! assert_eq!(ds.try_field("n").unwrap().shape(), &[3]);
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use fluxion_foundation::{AttrValue, CoordId, DimArray, FieldId};

use crate::error::{Error, Result};

/// A named collection of labeled arrays sharing coordinates.
///
/// Fields are keyed by [`FieldId`], coordinates by [`CoordId`]; both maps
/// iterate in insertion order. A coordinate is a 1-D array whose single
/// dimension carries its own name, giving every field axis named index
/// values to select and differentiate against.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Physical fields, one labeled array per quantity.
    fields: IndexMap<FieldId, DimArray>,
    /// Coordinate arrays, 1-D, keyed by their dimension name.
    coords: IndexMap<CoordId, DimArray>,
    /// Run metadata (grid sizes, separatrix indices, ...).
    metadata: IndexMap<String, AttrValue>,
    /// Optional run name.
    name: Option<String>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Get the run name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Insert a field, validating its extents against registered coordinates.
    ///
    /// For every axis of the array whose dimension name matches a coordinate,
    /// the extent along that axis must equal the coordinate's length.
    /// Replaces any existing field of the same name.
    pub fn insert_field(&mut self, name: impl Into<FieldId>, array: DimArray) -> Result<()> {
        let name = name.into();
        for (axis, dim) in array.dims().iter().enumerate() {
            if let Some(coord) = self.coords.get(dim.as_str()) {
                if coord.len() != array.shape()[axis] {
                    return Err(Error::ShapeMismatch {
                        context: format!("field '{}' along dimension '{}'", name, dim),
                        expected: coord.len(),
                        found: array.shape()[axis],
                    });
                }
            }
        }
        trace!(field = %name, "field inserted");
        self.fields.insert(name, array);
        Ok(())
    }

    /// Insert a coordinate array.
    ///
    /// The array must be 1-D and its single dimension must carry the
    /// coordinate's own name.
    pub fn insert_coord(&mut self, name: impl Into<CoordId>, array: DimArray) -> Result<()> {
        let name = name.into();
        if array.ndim() != 1 {
            return Err(Error::ShapeMismatch {
                context: format!("coordinate '{}' rank", name),
                expected: 1,
                found: array.ndim(),
            });
        }
        if array.dims()[0] != name.as_str() {
            return Err(Error::DimensionNotFound {
                dim: name.to_string(),
                field: format!("coordinate with dims {:?}", array.dims()),
            });
        }
        trace!(coord = %name, len = array.len(), "coordinate inserted");
        self.coords.insert(name, array);
        Ok(())
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&DimArray> {
        self.fields.get(name)
    }

    /// Get a field by name, or a missing-dependency error naming it.
    pub fn try_field(&self, name: &str) -> Result<&DimArray> {
        self.fields.get(name).ok_or_else(|| Error::missing_field(name))
    }

    /// Get a mutable reference to a field by name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut DimArray> {
        self.fields.get_mut(name)
    }

    /// Get a coordinate by name.
    pub fn coord(&self, name: &str) -> Option<&DimArray> {
        self.coords.get(name)
    }

    /// Get a coordinate by name, or a missing-dependency error naming it.
    pub fn try_coord(&self, name: &str) -> Result<&DimArray> {
        self.coords
            .get(name)
            .ok_or_else(|| Error::missing_coordinate(name))
    }

    /// Check whether a field is present.
    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field, returning it if present.
    pub fn remove_field(&mut self, name: &str) -> Option<DimArray> {
        self.fields.shift_remove(name)
    }

    /// Iterate over field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.keys()
    }

    /// Iterate over coordinate names in insertion order.
    pub fn coord_names(&self) -> impl Iterator<Item = &CoordId> {
        self.coords.keys()
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the dataset holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Move every 0-dimensional field into run metadata.
    ///
    /// Scalar variables in simulation output are run metadata (grid sizes,
    /// processor decomposition, guard cell counts), not physical data.
    /// Returns the names moved, in their original order.
    pub fn strip_scalar_metadata(&mut self) -> Vec<String> {
        let scalar_names: Vec<FieldId> = self
            .fields
            .iter()
            .filter(|(_, arr)| arr.ndim() == 0)
            .map(|(name, _)| name.clone())
            .collect();

        let mut moved = Vec::with_capacity(scalar_names.len());
        for name in scalar_names {
            if let Some(arr) = self.fields.shift_remove(name.as_str()) {
                self.metadata
                    .insert(name.to_string(), AttrValue::Float(arr.get(&[])));
                moved.push(name.to_string());
            }
        }
        debug!(count = moved.len(), "scalar variables moved to metadata");
        moved
    }

    /// Get the run metadata map.
    pub fn metadata(&self) -> &IndexMap<String, AttrValue> {
        &self.metadata
    }

    /// Set a run-metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: AttrValue) {
        self.metadata.insert(key.into(), value);
    }

    /// Get a run-metadata entry as an integer.
    ///
    /// Values stored as floats (scalar field data is `f64`) are truncated.
    pub fn meta_int(&self, key: &str) -> Result<i64> {
        self.metadata
            .get(key)
            .and_then(AttrValue::as_int)
            .ok_or_else(|| Error::MissingMetadata {
                key: key.to_owned(),
            })
    }

    /// Get a run-metadata entry as a float.
    pub fn meta_float(&self, key: &str) -> Result<f64> {
        self.metadata
            .get(key)
            .and_then(AttrValue::as_float)
            .ok_or_else(|| Error::MissingMetadata {
                key: key.to_owned(),
            })
    }

    /// Get a run-metadata entry as a flag (non-zero means set).
    pub fn meta_flag(&self, key: &str) -> Result<bool> {
        Ok(self.meta_int(key)? != 0)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset{}", match &self.name {
            Some(n) => format!(" '{}'", n),
            None => String::new(),
        })?;
        writeln!(f, "Fields:")?;
        for (name, arr) in &self.fields {
            writeln!(f, "  {}: {}", name, arr)?;
        }
        writeln!(f, "Coordinates:")?;
        for (name, arr) in &self.coords {
            writeln!(f, "  {}: {}", name, arr.len())?;
        }
        write!(f, "Metadata: {} entries", self.metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.insert_coord("x", DimArray::from_vec(&["x"], &[3], vec![0.0, 1.0, 2.0]))
            .unwrap();
        ds.insert_coord("z", DimArray::from_vec(&["z"], &[4], vec![0.0, 1.0, 2.0, 3.0]))
            .unwrap();
        ds.insert_field("phi", DimArray::zeros(&["x", "z"], &[3, 4]))
            .unwrap();
        ds
    }

    #[test]
    fn test_insert_and_lookup() {
        let ds = sample();
        assert!(ds.contains_field("phi"));
        assert_eq!(ds.try_field("phi").unwrap().shape(), &[3, 4]);
        assert_eq!(ds.try_coord("z").unwrap().len(), 4);
    }

    #[test]
    fn test_try_field_missing_names_it() {
        let ds = sample();
        let err = ds.try_field("Bxy").unwrap_err();
        assert!(matches!(err, Error::MissingField { ref name } if name == "Bxy"));
        assert_eq!(err.to_string(), "missing field: Bxy");
    }

    #[test]
    fn test_try_coord_missing_names_it() {
        let ds = sample();
        let err = ds.try_coord("y").unwrap_err();
        assert!(matches!(err, Error::MissingCoordinate { ref name } if name == "y"));
    }

    #[test]
    fn test_insert_field_checks_coord_extent() {
        let mut ds = sample();
        let err = ds
            .insert_field("bad", DimArray::zeros(&["x"], &[5]))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 3, found: 5, .. }));
    }

    #[test]
    fn test_insert_field_without_coord_is_free() {
        let mut ds = sample();
        // 'psi' has a dimension with no registered coordinate; any extent goes
        ds.insert_field("psi", DimArray::zeros(&["r"], &[17])).unwrap();
        assert!(ds.contains_field("psi"));
    }

    #[test]
    fn test_insert_coord_must_be_1d() {
        let mut ds = Dataset::new();
        let err = ds
            .insert_coord("x", DimArray::zeros(&["x", "z"], &[2, 2]))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 1, found: 2, .. }));
    }

    #[test]
    fn test_insert_coord_dim_name_must_match() {
        let mut ds = Dataset::new();
        let err = ds
            .insert_coord("x", DimArray::zeros(&["z"], &[2]))
            .unwrap_err();
        assert!(matches!(err, Error::DimensionNotFound { .. }));
    }

    #[test]
    fn test_remove_field() {
        let mut ds = sample();
        assert!(ds.remove_field("phi").is_some());
        assert!(!ds.contains_field("phi"));
        assert!(ds.remove_field("phi").is_none());
    }

    #[test]
    fn test_strip_scalar_metadata() {
        let mut ds = sample();
        ds.insert_field("nx", DimArray::scalar(3.0)).unwrap();
        ds.insert_field("MXG", DimArray::scalar(2.0)).unwrap();

        let moved = ds.strip_scalar_metadata();
        assert_eq!(moved, vec!["nx".to_string(), "MXG".to_string()]);
        assert!(!ds.contains_field("nx"));
        assert!(ds.contains_field("phi"));
        assert_eq!(ds.meta_int("nx").unwrap(), 3);
        assert_eq!(ds.meta_int("MXG").unwrap(), 2);
    }

    #[test]
    fn test_meta_accessors() {
        let mut ds = Dataset::new();
        ds.set_metadata("ny", AttrValue::Int(16));
        ds.set_metadata("keep_xboundaries", AttrValue::Int(0));
        assert_eq!(ds.meta_int("ny").unwrap(), 16);
        assert_eq!(ds.meta_float("ny").unwrap(), 16.0);
        assert!(!ds.meta_flag("keep_xboundaries").unwrap());
        let err = ds.meta_int("nz").unwrap_err();
        assert!(matches!(err, Error::MissingMetadata { ref key } if key == "nz"));
    }

    #[test]
    fn test_display_summary() {
        let mut ds = sample();
        ds.set_name("turbulence-run-7");
        let text = format!("{}", ds);
        assert!(text.contains("turbulence-run-7"));
        assert!(text.contains("phi"));
        assert!(text.contains("DimArray(x: 3, z: 4)"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let ds = sample();
        let json = serde_json::to_string(&ds).unwrap();
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.try_field("phi").unwrap(), ds.try_field("phi").unwrap());
        assert_eq!(back.coord_names().count(), 2);
    }
}

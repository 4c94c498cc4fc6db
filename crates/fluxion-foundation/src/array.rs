//! Labeled multi-dimensional arrays.
//!
//! [`DimArray`] is the value type for every physical quantity in a dataset:
//! a row-major `f64` array whose axes carry names, with Arc-based storage
//! for cheap cloning and copy-on-write mutation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attrs::{AttrValue, Attrs};

/// Errors from cross-array operations.
///
/// Indexing and construction mismatches are programmer errors and panic
/// (see the individual methods); mismatches between two runtime arrays
/// surface as values of this type.
#[derive(Debug, thiserror::Error)]
pub enum ArrayError {
    /// The named dimension is not an axis of the array.
    #[error("dimension '{dim}' not present in array with dims {dims:?}")]
    DimNotFound {
        /// The dimension that was requested.
        dim: String,
        /// The dimensions the array actually has.
        dims: Vec<String>,
    },

    /// A right-hand operand dimension does not appear in the left-hand array.
    #[error("cannot broadcast: dimension '{dim}' not present in left-hand dims {dims:?}")]
    BroadcastDim {
        /// The offending right-hand dimension.
        dim: String,
        /// The left-hand array's dimensions.
        dims: Vec<String>,
    },

    /// A shared dimension has different extents on the two operands.
    #[error("cannot broadcast: dimension '{dim}' has extent {found}, expected {expected}")]
    BroadcastExtent {
        /// The shared dimension with mismatched extents.
        dim: String,
        /// Extent on the left-hand array.
        expected: usize,
        /// Extent on the right-hand array.
        found: usize,
    },
}

/// A labeled multi-dimensional array with Arc-based storage.
///
/// Axes carry names (`dims`), so operations address axes by name rather
/// than position. Cloning is cheap (bumps a refcount); mutation through
/// [`DimArray::set`] is copy-on-write.
///
/// Equality compares dims, shape, and data; attributes are descriptive
/// metadata and do not participate in `==`.
///
/// # Example
///
/// ```
/// use fluxion_foundation::DimArray;
///
/// let a = DimArray::from_vec(&["x", "z"], &[2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert_eq!(a.get(&[1, 2]), 5.0);
/// assert_eq!(a.axis_of("z"), Some(1));
///
/// let b = a.clone();
/// assert!(a.shares_storage(&b));
/// ```
#[derive(Clone, Debug)]
pub struct DimArray {
    dims: Vec<String>,
    shape: Vec<usize>,
    data: Arc<[f64]>, // Row-major storage
    attrs: Attrs,
}

fn strides_for(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

impl DimArray {
    /// Create an array from a Vec (moves data).
    ///
    /// # Panics
    ///
    /// Panics if `dims` and `shape` differ in length, if a dimension name
    /// repeats, or if `data.len()` does not equal the product of `shape`.
    pub fn from_vec(dims: &[&str], shape: &[usize], data: Vec<f64>) -> Self {
        assert_eq!(
            dims.len(),
            shape.len(),
            "Got {} dim names for {} axes",
            dims.len(),
            shape.len()
        );
        for (i, dim) in dims.iter().enumerate() {
            assert!(
                !dims[..i].contains(dim),
                "Duplicate dimension name '{}'",
                dim
            );
        }
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "Data length {} does not match shape {:?}",
            data.len(),
            shape
        );
        Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            shape: shape.to_vec(),
            data: data.into(),
            attrs: Attrs::new(),
        }
    }

    /// Create an array filled with zeros.
    pub fn zeros(dims: &[&str], shape: &[usize]) -> Self {
        Self::from_elem(dims, shape, 0.0)
    }

    /// Create an array filled with a single value.
    pub fn from_elem(dims: &[&str], shape: &[usize], value: f64) -> Self {
        let len = shape.iter().product();
        Self::from_vec(dims, shape, vec![value; len])
    }

    /// Create a 0-dimensional array holding one value.
    pub fn scalar(value: f64) -> Self {
        Self::from_vec(&[], &[], vec![value])
    }

    /// Get the dimension names.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Get the extents along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of axes.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Get the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check whether the named dimension is an axis of this array.
    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Get the axis position of the named dimension.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Get raw data slice (row-major order).
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Check whether two arrays share the same underlying allocation.
    pub fn shares_storage(&self, other: &DimArray) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Get the attributes.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Get a single attribute by key.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Set a single attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        self.attrs.insert(key.into(), value);
    }

    fn flat_index(&self, index: &[usize]) -> usize {
        assert_eq!(
            index.len(),
            self.ndim(),
            "Index {:?} has wrong rank for shape {:?}",
            index,
            self.shape
        );
        let strides = strides_for(&self.shape);
        let mut flat = 0;
        for (axis, &i) in index.iter().enumerate() {
            assert!(
                i < self.shape[axis],
                "Index {:?} out of bounds for shape {:?}",
                index,
                self.shape
            );
            flat += i * strides[axis];
        }
        flat
    }

    /// Get the element at a multi-index (one entry per axis).
    ///
    /// # Panics
    ///
    /// Panics if the index has the wrong rank or is out of bounds.
    pub fn get(&self, index: &[usize]) -> f64 {
        self.data[self.flat_index(index)]
    }

    /// Set the element at a multi-index using copy-on-write.
    ///
    /// # Panics
    ///
    /// Panics if the index has the wrong rank or is out of bounds.
    pub fn set(&mut self, index: &[usize], value: f64) {
        let flat = self.flat_index(index);
        Arc::make_mut(&mut self.data)[flat] = value;
    }

    /// Apply a function to every element, producing a new array.
    ///
    /// The result has the same dims and shape and carries no attributes.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> DimArray {
        DimArray {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
            attrs: Attrs::new(),
        }
    }

    /// Elementwise negation.
    pub fn neg(&self) -> DimArray {
        self.map(|v| -v)
    }

    /// Combine with another array elementwise, broadcasting over shared
    /// dimensions.
    ///
    /// Every dimension of `rhs` must be an axis of `self` with the same
    /// extent; `rhs` values are repeated along the axes it lacks. The
    /// result has the dims and shape of `self` and carries no attributes.
    pub fn broadcast_with(
        &self,
        rhs: &DimArray,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<DimArray, ArrayError> {
        let rhs_strides = strides_for(&rhs.shape);
        // Stride contribution of each self axis into the rhs flat index
        // (zero for axes rhs does not have).
        let mut contrib = vec![0usize; self.ndim()];
        for (rhs_axis, dim) in rhs.dims.iter().enumerate() {
            let axis = self.axis_of(dim).ok_or_else(|| ArrayError::BroadcastDim {
                dim: dim.clone(),
                dims: self.dims.clone(),
            })?;
            if rhs.shape[rhs_axis] != self.shape[axis] {
                return Err(ArrayError::BroadcastExtent {
                    dim: dim.clone(),
                    expected: self.shape[axis],
                    found: rhs.shape[rhs_axis],
                });
            }
            contrib[axis] = rhs_strides[rhs_axis];
        }

        let strides = strides_for(&self.shape);
        let mut out = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            let mut j = 0;
            for axis in 0..self.ndim() {
                j += ((i / strides[axis]) % self.shape[axis]) * contrib[axis];
            }
            out.push(f(self.data[i], rhs.data[j]));
        }
        Ok(DimArray {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            data: out.into(),
            attrs: Attrs::new(),
        })
    }

    /// Elementwise addition with broadcasting.
    pub fn add(&self, rhs: &DimArray) -> Result<DimArray, ArrayError> {
        self.broadcast_with(rhs, |a, b| a + b)
    }

    /// Elementwise subtraction with broadcasting.
    pub fn sub(&self, rhs: &DimArray) -> Result<DimArray, ArrayError> {
        self.broadcast_with(rhs, |a, b| a - b)
    }

    /// Elementwise multiplication with broadcasting.
    pub fn mul(&self, rhs: &DimArray) -> Result<DimArray, ArrayError> {
        self.broadcast_with(rhs, |a, b| a * b)
    }

    /// Elementwise division with broadcasting.
    ///
    /// Division follows IEEE 754 semantics: a zero divisor yields ±inf
    /// (or NaN for 0/0). Such values are representable in the result and
    /// are never masked.
    pub fn div(&self, rhs: &DimArray) -> Result<DimArray, ArrayError> {
        self.broadcast_with(rhs, |a, b| a / b)
    }
}

impl PartialEq for DimArray {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
            && self.shape == other.shape
            && self.data.as_ref() == other.data.as_ref()
    }
}

impl fmt::Display for DimArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ndim() == 0 {
            return write!(f, "DimArray(scalar: {})", self.data[0]);
        }
        write!(f, "DimArray(")?;
        for (i, (dim, extent)) in self.dims.iter().zip(&self.shape).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", dim, extent)?;
        }
        write!(f, ")")
    }
}

// Custom Serialize implementation (Arc<[f64]> has no derived impl)
impl Serialize for DimArray {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DimArray", 4)?;
        state.serialize_field("dims", &self.dims)?;
        state.serialize_field("shape", &self.shape)?;
        state.serialize_field("data", self.data.as_ref())?;
        state.serialize_field("attrs", &self.attrs)?;
        state.end()
    }
}

// Custom Deserialize implementation
impl<'de> Deserialize<'de> for DimArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier, rename_all = "lowercase")]
        enum Field {
            Dims,
            Shape,
            Data,
            Attrs,
        }

        struct DimArrayVisitor;

        impl<'de> serde::de::Visitor<'de> for DimArrayVisitor {
            type Value = DimArray;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("struct DimArray")
            }

            fn visit_map<V>(self, mut map: V) -> Result<DimArray, V::Error>
            where
                V: serde::de::MapAccess<'de>,
            {
                let mut dims: Option<Vec<String>> = None;
                let mut shape: Option<Vec<usize>> = None;
                let mut data: Option<Vec<f64>> = None;
                let mut attrs: Option<Attrs> = None;

                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Dims => {
                            if dims.is_some() {
                                return Err(serde::de::Error::duplicate_field("dims"));
                            }
                            dims = Some(map.next_value()?);
                        }
                        Field::Shape => {
                            if shape.is_some() {
                                return Err(serde::de::Error::duplicate_field("shape"));
                            }
                            shape = Some(map.next_value()?);
                        }
                        Field::Data => {
                            if data.is_some() {
                                return Err(serde::de::Error::duplicate_field("data"));
                            }
                            data = Some(map.next_value()?);
                        }
                        Field::Attrs => {
                            if attrs.is_some() {
                                return Err(serde::de::Error::duplicate_field("attrs"));
                            }
                            attrs = Some(map.next_value()?);
                        }
                    }
                }

                let dims = dims.ok_or_else(|| serde::de::Error::missing_field("dims"))?;
                let shape = shape.ok_or_else(|| serde::de::Error::missing_field("shape"))?;
                let data = data.ok_or_else(|| serde::de::Error::missing_field("data"))?;
                let expected: usize = shape.iter().product();
                if dims.len() != shape.len() || data.len() != expected {
                    return Err(serde::de::Error::custom(format!(
                        "inconsistent DimArray: {} dims, shape {:?}, {} values",
                        dims.len(),
                        shape,
                        data.len()
                    )));
                }

                Ok(DimArray {
                    dims,
                    shape,
                    data: data.into(),
                    attrs: attrs.unwrap_or_default(),
                })
            }
        }

        const FIELDS: &[&str] = &["dims", "shape", "data", "attrs"];
        deserializer.deserialize_struct("DimArray", FIELDS, DimArrayVisitor)
    }
}

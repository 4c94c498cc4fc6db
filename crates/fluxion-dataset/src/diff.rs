//! Differentiation along a named coordinate.
//!
//! The [`Differentiator`] trait is the seam between derived-quantity rules
//! and the numeric scheme that evaluates them; [`CentralDifference`] is the
//! default implementation. Keeping the seam a trait lets tests substitute
//! an instrumented scheme and count invocations.

use tracing::trace;

use fluxion_foundation::DimArray;

use crate::error::{Error, Result};

/// Computes the partial derivative of a field along one of its dimensions.
pub trait Differentiator {
    /// Differentiate `field` with respect to the coordinate values in
    /// `coord`, along the axis named `dim`.
    ///
    /// The result has the same dims and shape as `field` and carries no
    /// attributes. Inputs are read-only.
    fn differentiate(&self, field: &DimArray, coord: &DimArray, dim: &str) -> Result<DimArray>;
}

/// Second-order central differences on the interior, first-order one-sided
/// differences at the two boundary points.
///
/// Interior: `df[i] = (f[i+1] - f[i-1]) / (x[i+1] - x[i-1])`.
/// Boundaries: `df[0] = (f[1] - f[0]) / (x[1] - x[0])` and the mirror at
/// the upper end. Exact for fields linear in the coordinate. The scheme
/// handles non-uniform coordinate spacing; output shape always equals
/// input shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct CentralDifference;

impl Differentiator for CentralDifference {
    fn differentiate(&self, field: &DimArray, coord: &DimArray, dim: &str) -> Result<DimArray> {
        let axis = field.axis_of(dim).ok_or_else(|| Error::DimensionNotFound {
            dim: dim.to_owned(),
            field: format!("array with dims {:?}", field.dims()),
        })?;
        let n = field.shape()[axis];
        if coord.ndim() != 1 {
            return Err(Error::ShapeMismatch {
                context: format!("coordinate '{}' rank", dim),
                expected: 1,
                found: coord.ndim(),
            });
        }
        if coord.len() != n {
            return Err(Error::ShapeMismatch {
                context: format!("coordinate '{}' against field axis", dim),
                expected: n,
                found: coord.len(),
            });
        }
        if n < 2 {
            return Err(Error::ShapeMismatch {
                context: format!("axis '{}' too short to differentiate", dim),
                expected: 2,
                found: n,
            });
        }

        let x = coord.data();
        let f = field.data();
        // Row-major: stride of `axis` is the product of trailing extents.
        let stride: usize = field.shape()[axis + 1..].iter().product();

        let mut out = vec![0.0; f.len()];
        for (i, slot) in out.iter_mut().enumerate() {
            let pos = (i / stride) % n;
            *slot = if pos == 0 {
                (f[i + stride] - f[i]) / (x[1] - x[0])
            } else if pos == n - 1 {
                (f[i] - f[i - stride]) / (x[n - 1] - x[n - 2])
            } else {
                (f[i + stride] - f[i - stride]) / (x[pos + 1] - x[pos - 1])
            };
        }

        trace!(dim, n, "differentiated along coordinate");
        Ok(DimArray::from_vec(
            &field.dims().iter().map(String::as_str).collect::<Vec<_>>(),
            field.shape(),
            out,
        ))
    }
}

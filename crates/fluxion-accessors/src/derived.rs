//! Derived-field rules and the compute-or-fetch accessor.
//!
//! A derived field starts absent from its dataset. On first request it is
//! computed from the base fields and coordinates named by its rule,
//! tagged with a human-readable name, and inserted into the dataset under
//! its canonical name; every later request returns the stored array
//! unchanged. The transition is one-way: only external removal makes a
//! derived field absent again.

use tracing::{debug, trace};

use fluxion_dataset::{CentralDifference, Dataset, Differentiator, Error, Result};
use fluxion_foundation::{AttrValue, DimArray, LONG_NAME};

/// Sign applied to the differentiated source before division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Keep the derivative as computed.
    Positive,
    /// Negate the derivative.
    Negative,
}

/// Declarative rule for one derived quantity.
///
/// A rule reads as: differentiate `source` along `along`, apply `sign`,
/// divide elementwise by `divisor` (if any), tag the result with
/// `long_name`, and cache it under `name`.
#[derive(Debug, Clone, Copy)]
pub struct DerivedFieldSpec {
    /// Canonical cache name (e.g., "v_radial").
    pub name: &'static str,
    /// Human-readable name stored as the `long_name` attribute.
    pub long_name: &'static str,
    /// Field the derivative is taken of.
    pub source: &'static str,
    /// Coordinate the derivative is taken along.
    pub along: &'static str,
    /// Sign convention of the quantity.
    pub sign: Sign,
    /// Field the signed derivative is divided by, if any.
    pub divisor: Option<&'static str>,
}

/// E×B drift velocities from the electrostatic potential.
///
/// The radial component is the binormal electric field over the magnetic
/// field magnitude, `(d phi / d z) / Bxy`; the binormal component is the
/// negated radial electric field over the field magnitude,
/// `-(d phi / d x) / Bxy`.
pub const EXB_DRIFTS: &[DerivedFieldSpec] = &[
    DerivedFieldSpec {
        name: "v_radial",
        long_name: "radial velocity",
        source: "phi",
        along: "z",
        sign: Sign::Positive,
        divisor: Some("Bxy"),
    },
    DerivedFieldSpec {
        name: "v_binormal",
        long_name: "binormal velocity",
        source: "phi",
        along: "x",
        sign: Sign::Negative,
        divisor: Some("Bxy"),
    },
];

/// Lazily computes derived quantities and memoizes them on the dataset.
///
/// The accessor owns no dataset state: it holds the rule tables and the
/// differentiation scheme, and every operation takes the dataset it acts
/// on. `&mut Dataset` makes the check-then-store sequence exclusive by
/// construction; concurrent computation of the same derived field on one
/// dataset cannot compile.
///
/// Downstream crates add quantities by composing tables with
/// [`DriftAccessor::extend`]; earlier tables win on name collisions, so
/// an extension cannot shadow a base rule.
///
/// # Example
///
/// ```
/// use fluxion_accessors::DriftAccessor;
/// use fluxion_dataset::Dataset;
/// use fluxion_foundation::DimArray;
///
/// let mut ds = Dataset::new();
/// ds.insert_coord("x", DimArray::from_vec(&["x"], &[3], vec![0.0, 1.0, 2.0])).unwrap();
/// ds.insert_coord("z", DimArray::from_vec(&["z"], &[3], vec![0.0, 1.0, 2.0])).unwrap();
/// // phi = z and Bxy = 2 everywhere, so v_radial = (d phi / d z) / Bxy = 0.5
/// ds.insert_field("phi", DimArray::from_vec(&["x", "z"], &[3, 3],
///     vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0])).unwrap();
/// ds.insert_field("Bxy", DimArray::from_elem(&["x"], &[3], 2.0)).unwrap();
///
/// let accessor = DriftAccessor::new();
/// let v = accessor.radial_velocity(&mut ds).unwrap();
/// assert!(v.data().iter().all(|&v| v == 0.5));
///
/// // The result is now an ordinary field of the dataset
/// assert!(ds.contains_field("v_radial"));
/// ```
#[derive(Debug, Clone)]
pub struct DriftAccessor<D: Differentiator = CentralDifference> {
    tables: Vec<&'static [DerivedFieldSpec]>,
    diff: D,
}

impl DriftAccessor<CentralDifference> {
    /// Create an accessor with the base E×B drift table and the default
    /// central-difference scheme.
    pub fn new() -> Self {
        Self::with_differentiator(CentralDifference)
    }
}

impl Default for DriftAccessor<CentralDifference> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Differentiator> DriftAccessor<D> {
    /// Create an accessor with the base table and a custom differentiation
    /// scheme.
    pub fn with_differentiator(diff: D) -> Self {
        Self {
            tables: vec![EXB_DRIFTS],
            diff,
        }
    }

    /// Append a table of additional derived-field rules.
    ///
    /// On a name collision the earlier table wins; the base rules keep
    /// their canonical meaning.
    pub fn extend(mut self, table: &'static [DerivedFieldSpec]) -> Self {
        self.tables.push(table);
        self
    }

    /// Look up the rule for a derived-field name (first match wins).
    pub fn lookup(&self, name: &str) -> Option<&'static DerivedFieldSpec> {
        self.tables
            .iter()
            .copied()
            .flat_map(<[DerivedFieldSpec]>::iter)
            .find(|spec| spec.name == name)
    }

    /// All derived-field names known to this accessor, in table order.
    pub fn derived_names(&self) -> Vec<&'static str> {
        self.tables
            .iter()
            .copied()
            .flat_map(<[DerivedFieldSpec]>::iter)
            .map(|spec| spec.name)
            .collect()
    }

    /// Compute a derived field, or fetch it from the dataset if already
    /// present.
    ///
    /// On a cache hit the returned array shares storage with the stored
    /// one and nothing is recomputed or mutated. On a miss, every input
    /// named by the rule must be present (a missing one fails with an
    /// error naming it, and the dataset is left untouched); the result is
    /// stored under the rule's canonical name and returned. The rule's
    /// inputs are never modified. A zero divisor yields IEEE inf/NaN in
    /// the output, not an error.
    pub fn derived(&self, ds: &mut Dataset, name: &str) -> Result<DimArray> {
        if let Some(existing) = ds.field(name) {
            trace!(field = %name, "derived field present, returning stored value");
            return Ok(existing.clone());
        }

        let spec = self
            .lookup(name)
            .ok_or_else(|| Error::UnknownDerivedField {
                name: name.to_owned(),
            })?;

        // Resolve every dependency before doing any numeric work, so a
        // missing one fails without touching the dataset.
        let source = ds.try_field(spec.source)?;
        let coord = ds.try_coord(spec.along)?;
        let divisor = spec.divisor.map(|d| ds.try_field(d)).transpose()?;

        let gradient = self.diff.differentiate(source, coord, spec.along)?;
        let mut result = match spec.sign {
            Sign::Positive => gradient,
            Sign::Negative => gradient.neg(),
        };
        if let Some(divisor) = divisor {
            result = result.div(divisor)?;
        }
        result.set_attr(LONG_NAME, AttrValue::text(spec.long_name));

        debug!(
            field = %spec.name,
            source = %spec.source,
            along = %spec.along,
            "computed derived field"
        );
        ds.insert_field(spec.name, result.clone())?;
        Ok(result)
    }

    /// The radial E×B drift velocity, `(d phi / d z) / Bxy`, cached as
    /// `v_radial`.
    pub fn radial_velocity(&self, ds: &mut Dataset) -> Result<DimArray> {
        self.derived(ds, "v_radial")
    }

    /// The binormal E×B drift velocity, `-(d phi / d x) / Bxy`, cached as
    /// `v_binormal`.
    pub fn binormal_velocity(&self, ds: &mut Dataset) -> Result<DimArray> {
        self.derived(ds, "v_binormal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_table_entries() {
        let accessor = DriftAccessor::new();
        assert_eq!(accessor.derived_names(), vec!["v_radial", "v_binormal"]);

        let radial = accessor.lookup("v_radial").unwrap();
        assert_eq!(radial.source, "phi");
        assert_eq!(radial.along, "z");
        assert_eq!(radial.sign, Sign::Positive);
        assert_eq!(radial.divisor, Some("Bxy"));

        let binormal = accessor.lookup("v_binormal").unwrap();
        assert_eq!(binormal.along, "x");
        assert_eq!(binormal.sign, Sign::Negative);
    }

    #[test]
    fn test_lookup_unknown() {
        let accessor = DriftAccessor::new();
        assert!(accessor.lookup("v_parallel").is_none());
    }

    static SHADOW_TABLE: &[DerivedFieldSpec] = &[DerivedFieldSpec {
        name: "v_radial",
        long_name: "shadowed",
        source: "phi",
        along: "x",
        sign: Sign::Negative,
        divisor: None,
    }];

    #[test]
    fn test_extension_cannot_shadow_base_rule() {
        let accessor = DriftAccessor::new().extend(SHADOW_TABLE);
        let spec = accessor.lookup("v_radial").unwrap();
        assert_eq!(spec.long_name, "radial velocity");
    }
}

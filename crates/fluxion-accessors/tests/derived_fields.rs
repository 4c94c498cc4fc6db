//! End-to-end behavior of the derived-field accessor: cache contract,
//! sign conventions, missing-dependency failures, metadata tagging, and
//! mutation isolation.

use std::cell::Cell;
use std::rc::Rc;

use fluxion_accessors::{DerivedFieldSpec, DriftAccessor, Sign};
use fluxion_dataset::{CentralDifference, Dataset, Differentiator, Error, Result};
use fluxion_foundation::{AttrValue, DimArray, LONG_NAME};

const NX: usize = 4;
const NZ: usize = 5;

/// Dataset with coords x = 0..4, z = 0..5 and fields phi(x, z), Bxy(x).
/// `phi` is filled from the coordinate values, `Bxy` is uniform.
fn drift_dataset(phi: impl Fn(f64, f64) -> f64, bxy: f64) -> Dataset {
    let xvals: Vec<f64> = (0..NX).map(|i| i as f64).collect();
    let zvals: Vec<f64> = (0..NZ).map(|k| k as f64).collect();

    let mut data = Vec::with_capacity(NX * NZ);
    for &x in &xvals {
        for &z in &zvals {
            data.push(phi(x, z));
        }
    }

    let mut ds = Dataset::new();
    ds.insert_coord("x", DimArray::from_vec(&["x"], &[NX], xvals))
        .unwrap();
    ds.insert_coord("z", DimArray::from_vec(&["z"], &[NZ], zvals))
        .unwrap();
    ds.insert_field("phi", DimArray::from_vec(&["x", "z"], &[NX, NZ], data))
        .unwrap();
    ds.insert_field("Bxy", DimArray::from_elem(&["x"], &[NX], bxy))
        .unwrap();
    ds
}

/// Delegates to central differences while counting invocations, to make
/// "no recomputation on cache hit" observable.
struct CountingDifferentiator {
    calls: Rc<Cell<usize>>,
}

impl Differentiator for CountingDifferentiator {
    fn differentiate(&self, field: &DimArray, coord: &DimArray, dim: &str) -> Result<DimArray> {
        self.calls.set(self.calls.get() + 1);
        CentralDifference.differentiate(field, coord, dim)
    }
}

#[test]
fn radial_velocity_shape_matches_phi() {
    let mut ds = drift_dataset(|_, z| z, 2.0);
    let v = DriftAccessor::new().radial_velocity(&mut ds).unwrap();
    assert_eq!(v.shape(), ds.try_field("phi").unwrap().shape());
    assert_eq!(v.dims(), ds.try_field("phi").unwrap().dims());
}

#[test]
fn radial_velocity_value_for_identity_phi() {
    // phi = z, Bxy = 2: E_z = 1, so v_radial = 0.5 everywhere
    let mut ds = drift_dataset(|_, z| z, 2.0);
    let v = DriftAccessor::new().radial_velocity(&mut ds).unwrap();
    assert!(v.data().iter().all(|&v| v == 0.5));
}

#[test]
fn binormal_velocity_sign_convention() {
    // phi = x, Bxy = 1: d phi / d x = 1, so v_binormal = -1 everywhere
    let mut ds = drift_dataset(|x, _| x, 1.0);
    let v = DriftAccessor::new().binormal_velocity(&mut ds).unwrap();
    assert!(v.data().iter().all(|&v| v == -1.0));
}

#[test]
fn second_call_is_a_cache_hit() {
    let calls = Rc::new(Cell::new(0));
    let accessor = DriftAccessor::with_differentiator(CountingDifferentiator {
        calls: Rc::clone(&calls),
    });
    let mut ds = drift_dataset(|_, z| z, 2.0);

    let first = accessor.radial_velocity(&mut ds).unwrap();
    assert_eq!(calls.get(), 1);

    let second = accessor.radial_velocity(&mut ds).unwrap();
    // No additional differentiation work, and the very same storage
    assert_eq!(calls.get(), 1);
    assert!(second.shares_storage(&first));
    assert!(second.shares_storage(ds.try_field("v_radial").unwrap()));
}

#[test]
fn returned_array_is_the_stored_one() {
    let mut ds = drift_dataset(|_, z| z, 2.0);
    let v = DriftAccessor::new().radial_velocity(&mut ds).unwrap();
    assert!(v.shares_storage(ds.try_field("v_radial").unwrap()));
}

#[test]
fn repeated_calls_do_not_grow_the_dataset() {
    let mut ds = drift_dataset(|_, z| z, 2.0);
    let accessor = DriftAccessor::new();
    accessor.radial_velocity(&mut ds).unwrap();
    let fields_after_first = ds.len();
    accessor.radial_velocity(&mut ds).unwrap();
    accessor.radial_velocity(&mut ds).unwrap();
    assert_eq!(ds.len(), fields_after_first);
}

#[test]
fn missing_bxy_names_the_missing_field() {
    let mut ds = drift_dataset(|_, z| z, 2.0);
    ds.remove_field("Bxy").unwrap();

    let err = DriftAccessor::new().radial_velocity(&mut ds).unwrap_err();
    assert!(matches!(err, Error::MissingField { ref name } if name == "Bxy"));
    // The failed call left no partial result behind
    assert!(!ds.contains_field("v_radial"));
}

#[test]
fn missing_coordinate_names_it() {
    let mut ds = Dataset::new();
    ds.insert_field("phi", DimArray::zeros(&["x", "z"], &[NX, NZ]))
        .unwrap();
    ds.insert_field("Bxy", DimArray::from_elem(&["x"], &[NX], 1.0))
        .unwrap();

    let err = DriftAccessor::new().radial_velocity(&mut ds).unwrap_err();
    assert!(matches!(err, Error::MissingCoordinate { ref name } if name == "z"));
}

#[test]
fn unknown_derived_field_is_an_error() {
    let mut ds = drift_dataset(|_, z| z, 2.0);
    let err = DriftAccessor::new().derived(&mut ds, "v_parallel").unwrap_err();
    assert!(matches!(err, Error::UnknownDerivedField { ref name } if name == "v_parallel"));
}

#[test]
fn derived_fields_are_tagged_with_long_names() {
    let mut ds = drift_dataset(|x, z| x + z, 1.0);
    let accessor = DriftAccessor::new();
    accessor.radial_velocity(&mut ds).unwrap();
    accessor.binormal_velocity(&mut ds).unwrap();

    assert_eq!(
        ds.try_field("v_radial").unwrap().attr(LONG_NAME),
        Some(&AttrValue::text("radial velocity"))
    );
    assert_eq!(
        ds.try_field("v_binormal").unwrap().attr(LONG_NAME),
        Some(&AttrValue::text("binormal velocity"))
    );
}

#[test]
fn inputs_are_not_mutated() {
    let mut ds = drift_dataset(|x, z| x * z, 2.0);
    let phi_before = ds.try_field("phi").unwrap().clone();
    let bxy_before = ds.try_field("Bxy").unwrap().clone();

    let accessor = DriftAccessor::new();
    accessor.radial_velocity(&mut ds).unwrap();
    accessor.binormal_velocity(&mut ds).unwrap();

    let phi_after = ds.try_field("phi").unwrap();
    let bxy_after = ds.try_field("Bxy").unwrap();
    assert_eq!(phi_after, &phi_before);
    assert_eq!(bxy_after, &bxy_before);
    // Bit-identical down to the allocation: nothing copied them on write
    assert!(phi_after.shares_storage(&phi_before));
    assert!(bxy_after.shares_storage(&bxy_before));
}

#[test]
fn zero_bxy_gives_ieee_infinities_not_errors() {
    // phi = z: E_z = 1 everywhere, so 1 / 0 = +inf at every point
    let mut ds = drift_dataset(|_, z| z, 0.0);
    let v = DriftAccessor::new().radial_velocity(&mut ds).unwrap();
    assert!(v.data().iter().all(|v| v.is_infinite()));
}

static PARALLEL_FIELDS: &[DerivedFieldSpec] = &[DerivedFieldSpec {
    name: "E_parallel",
    long_name: "parallel electric field",
    source: "phi",
    along: "y",
    sign: Sign::Negative,
    divisor: None,
}];

#[test]
fn extension_table_adds_a_quantity() {
    let nyv = 3;
    let yvals: Vec<f64> = (0..nyv).map(|j| j as f64).collect();
    let mut ds = Dataset::new();
    ds.insert_coord("y", DimArray::from_vec(&["y"], &[nyv], yvals.clone()))
        .unwrap();
    // phi = y: -d phi / d y = -1 everywhere, no divisor
    ds.insert_field("phi", DimArray::from_vec(&["y"], &[nyv], yvals))
        .unwrap();

    let accessor = DriftAccessor::new().extend(PARALLEL_FIELDS);
    let e = accessor.derived(&mut ds, "E_parallel").unwrap();
    assert!(e.data().iter().all(|&v| v == -1.0));
    assert_eq!(
        ds.try_field("E_parallel").unwrap().attr(LONG_NAME),
        Some(&AttrValue::text("parallel electric field"))
    );
}
